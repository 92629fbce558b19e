use crate::domain::DashflowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of cross-widget channels.
///
/// A publisher and its subscribers agree on a channel by type, so a typo is a
/// compile error instead of a silently dead subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    ShowPublisherDetails,
    ShowSubCategoryDetails,
    ShowRuleDetails,
    ShowGeoDetails,
    ShowMailingListDetails,
    ShowReportDetails,
}

impl Channel {
    /// Every channel, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::ShowPublisherDetails,
        Self::ShowSubCategoryDetails,
        Self::ShowRuleDetails,
        Self::ShowGeoDetails,
        Self::ShowMailingListDetails,
        Self::ShowReportDetails,
    ];

    /// Wire name of the channel, e.g. `"showGeoDetails"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShowPublisherDetails => "showPublisherDetails",
            Self::ShowSubCategoryDetails => "showSubCategoryDetails",
            Self::ShowRuleDetails => "showRuleDetails",
            Self::ShowGeoDetails => "showGeoDetails",
            Self::ShowMailingListDetails => "showMailingListDetails",
            Self::ShowReportDetails => "showReportDetails",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = DashflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| DashflowError::UnknownChannel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for channel in Channel::ALL {
            assert_eq!(channel.as_str().parse::<Channel>().unwrap(), channel);
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = "showEverything".parse::<Channel>().unwrap_err();
        assert!(matches!(err, DashflowError::UnknownChannel(name) if name == "showEverything"));
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&Channel::ShowSubCategoryDetails).unwrap();
        assert_eq!(json, "\"showSubCategoryDetails\"");
    }
}
