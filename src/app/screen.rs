//! Declarative screen descriptors.
//!
//! Every dashboard screen runs the same orchestration machinery. What differs
//! is data: which inputs must be present before anything is fetched, which
//! optional payload fields are sent, which exports are offered, and which bus
//! channel a row click publishes on. [`ScreenKind::descriptor`] is the single
//! table holding those differences.

use crate::bus::Channel;
use crate::domain::{names, DashflowError, ExportFormat};
use crate::query::Capabilities;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The dashboard screens this core drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScreenKind {
    /// Per-publisher traffic summary with drill-down.
    PublisherSummary,
    /// Fraud sub-category breakdown for one category.
    FraudSubCategory,
    /// Fraud rule configuration table.
    RuleConfig,
    /// Geo blocking configuration table.
    GeoConfig,
    /// Mailing list management page.
    MailingList,
    /// Scheduled and ad-hoc reports page.
    Reports,
    /// Delivery-options modal. Export only, no listing.
    DeliveryOptions,
}

/// Static description of one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenDescriptor {
    /// The screen this descriptor belongs to.
    pub kind: ScreenKind,
    /// Inputs that must be present before any request is built.
    pub required: &'static [&'static str],
    /// Optional filters that flow into the payload when set.
    pub extra_filters: &'static [&'static str],
    /// Optional payload fields (event type, conversion date, search, sort).
    pub capabilities: Capabilities,
    /// Export kinds offered, with the format each one requests.
    pub exports: &'static [(&'static str, ExportFormat)],
    /// Channel a row activation publishes on, if the screen has a detail view.
    pub detail_channel: Option<Channel>,
    /// Whether the screen shows a paginated listing at all.
    pub listing: bool,
}

const DATE_WINDOW: &[&str] = &[names::TENANT, names::START, names::END];
const TENANT_ONLY: &[&str] = &[names::TENANT];
const CSV: &[(&str, ExportFormat)] = &[("csv", ExportFormat::Csv)];

impl ScreenKind {
    /// Every screen, in navigation order.
    pub const ALL: [Self; 7] = [
        Self::PublisherSummary,
        Self::FraudSubCategory,
        Self::RuleConfig,
        Self::GeoConfig,
        Self::MailingList,
        Self::Reports,
        Self::DeliveryOptions,
    ];

    /// Stable camelCase name, as accepted by [`FromStr`](std::str::FromStr).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PublisherSummary => "publisherSummary",
            Self::FraudSubCategory => "fraudSubCategory",
            Self::RuleConfig => "ruleConfig",
            Self::GeoConfig => "geoConfig",
            Self::MailingList => "mailingList",
            Self::Reports => "reports",
            Self::DeliveryOptions => "deliveryOptions",
        }
    }

    /// The static descriptor driving this screen's state.
    ///
    /// # Returns
    ///
    /// A [`ScreenDescriptor`] listing required and optional filters,
    /// capabilities, exports and the detail channel.
    #[must_use]
    pub const fn descriptor(self) -> ScreenDescriptor {
        match self {
            Self::PublisherSummary => ScreenDescriptor {
                kind: self,
                required: DATE_WINDOW,
                extra_filters: &[names::VIEW_KEY],
                capabilities: Capabilities {
                    event_type: true,
                    conversion_date: true,
                    search: false,
                    sort: true,
                },
                exports: CSV,
                detail_channel: Some(Channel::ShowPublisherDetails),
                listing: true,
            },
            Self::FraudSubCategory => ScreenDescriptor {
                kind: self,
                required: &[names::TENANT, names::START, names::END, names::CATEGORY],
                extra_filters: &[names::VIEW_KEY],
                capabilities: Capabilities {
                    event_type: true,
                    conversion_date: false,
                    search: false,
                    sort: true,
                },
                exports: CSV,
                detail_channel: Some(Channel::ShowSubCategoryDetails),
                listing: true,
            },
            Self::RuleConfig => ScreenDescriptor {
                kind: self,
                required: TENANT_ONLY,
                extra_filters: &[names::STATUS],
                capabilities: Capabilities::listing(),
                exports: &[],
                detail_channel: Some(Channel::ShowRuleDetails),
                listing: true,
            },
            Self::GeoConfig => ScreenDescriptor {
                kind: self,
                required: TENANT_ONLY,
                extra_filters: &[names::COUNTRIES, names::STATUS],
                capabilities: Capabilities::listing(),
                exports: &[],
                detail_channel: Some(Channel::ShowGeoDetails),
                listing: true,
            },
            Self::MailingList => ScreenDescriptor {
                kind: self,
                required: TENANT_ONLY,
                extra_filters: &[names::STATUS],
                capabilities: Capabilities::listing(),
                exports: CSV,
                detail_channel: Some(Channel::ShowMailingListDetails),
                listing: true,
            },
            Self::Reports => ScreenDescriptor {
                kind: self,
                required: DATE_WINDOW,
                extra_filters: &[],
                capabilities: Capabilities::listing(),
                exports: &[("report", ExportFormat::Xlsx)],
                detail_channel: Some(Channel::ShowReportDetails),
                listing: true,
            },
            Self::DeliveryOptions => ScreenDescriptor {
                kind: self,
                required: DATE_WINDOW,
                extra_filters: &[names::VIEW_KEY],
                capabilities: Capabilities {
                    event_type: false,
                    conversion_date: true,
                    search: false,
                    sort: false,
                },
                exports: &[("csv", ExportFormat::Csv), ("report", ExportFormat::Xlsx)],
                detail_channel: None,
                listing: false,
            },
        }
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreenKind {
    type Err = DashflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DashflowError::UnknownScreen(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_screen_requires_a_tenant() {
        for kind in ScreenKind::ALL {
            assert!(kind.descriptor().required.contains(&names::TENANT), "{kind}");
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for kind in ScreenKind::ALL {
            assert_eq!(kind.as_str().parse::<ScreenKind>().unwrap(), kind);
        }
        assert!(matches!("dashboard".parse::<ScreenKind>(), Err(DashflowError::UnknownScreen(_))));
    }

    #[test]
    fn export_only_screen_has_no_listing() {
        let d = ScreenKind::DeliveryOptions.descriptor();
        assert!(!d.listing);
        assert_eq!(d.exports.len(), 2);
        assert_eq!(d.detail_channel, None);
    }
}
