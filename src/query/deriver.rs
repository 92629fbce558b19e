//! Payload derivation with capability-driven optional fields.
//!
//! One [`PayloadDeriver`] serves every screen. What differs between screens
//! (which filters are tracked, whether the event-type filter or the
//! conversion-date flag is sent, whether search and sorting apply) is expressed
//! as data in [`Capabilities`] and the tracked filter list, never as a separate
//! deriver implementation.

use super::readiness::ReadinessGate;
use crate::domain::{names, ExportFormat, FilterState, QueryPayload};
use std::sync::Arc;

/// Optional payload fields a screen variant may enable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Send the `eventType` filter.
    pub event_type: bool,
    /// Send the `conversionDate` flag.
    pub conversion_date: bool,
    /// Send the settled free-text search term.
    pub search: bool,
    /// Send the sort key.
    pub sort: bool,
}

impl Capabilities {
    /// Capabilities shared by plain listing screens: search and sort, no optional filters.
    #[must_use]
    pub const fn listing() -> Self {
        Self {
            event_type: false,
            conversion_date: false,
            search: true,
            sort: true,
        }
    }
}

/// Borrowed view of everything a derivation may read.
#[derive(Debug, Clone, Copy)]
pub struct DeriveInputs<'a> {
    /// All filter inputs. Only tracked names are projected into the payload.
    pub filters: &'a FilterState,

    /// One-based page index, already reset by the pagination coordinator.
    pub page: u32,

    pub page_size: u32,

    /// Settled search term. Ignored unless [`Capabilities::search`] is set.
    pub search: Option<&'a str>,

    /// Sort column. Ignored unless [`Capabilities::sort`] is set.
    pub sort_key: Option<&'a str>,
}

/// Maps inputs to an immutable [`QueryPayload`], or `None` while not ready.
#[derive(Debug, Clone)]
pub struct PayloadDeriver {
    gate: ReadinessGate,

    /// Sorted, de-duplicated filter names that reach the payload.
    tracked: Vec<String>,

    capabilities: Capabilities,

    /// Last payload handed out by [`derive_shared`](Self::derive_shared).
    last: Option<Arc<QueryPayload>>,
}

impl PayloadDeriver {
    /// Creates a deriver tracking the gate's required inputs, the given extra
    /// filters, and the filters switched on by `capabilities`.
    ///
    /// # Parameters
    ///
    /// * `gate` - Readiness gate; its required filters are always tracked
    /// * `extra_filters` - Optional filters the screen also sends
    /// * `capabilities` - Optional payload fields enabled for this screen
    pub fn new<I, S>(gate: ReadinessGate, extra_filters: I, capabilities: Capabilities) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tracked: Vec<String> = gate.required().to_vec();
        tracked.extend(extra_filters.into_iter().map(Into::into));
        if capabilities.event_type {
            tracked.push(names::EVENT_TYPE.to_string());
        }
        if capabilities.conversion_date {
            tracked.push(names::CONVERSION_DATE.to_string());
        }
        tracked.sort();
        tracked.dedup();

        Self {
            gate,
            tracked,
            capabilities,
            last: None,
        }
    }

    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The readiness gate consulted before every derivation.
    #[must_use]
    pub const fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    /// Filter names that flow into the payload, sorted.
    #[must_use]
    pub fn tracked(&self) -> &[String] {
        &self.tracked
    }

    /// Whether `inputs` satisfy the readiness gate.
    #[must_use]
    pub fn is_ready(&self, inputs: &DeriveInputs<'_>) -> bool {
        self.gate.is_ready(inputs.filters)
    }

    /// Pure derivation. Idempotent: unchanged tracked inputs give equal payloads.
    ///
    /// # Returns
    ///
    /// `None` while any required filter is missing or blank, otherwise a
    /// payload holding the tracked filters, a page of at least 1, and the
    /// search and sort fields the capabilities allow.
    #[must_use]
    pub fn derive(&self, inputs: &DeriveInputs<'_>) -> Option<QueryPayload> {
        if !self.is_ready(inputs) {
            return None;
        }

        let mut payload = QueryPayload::new(
            inputs.filters.project(self.tracked.iter().map(String::as_str)),
            inputs.page.max(1),
            inputs.page_size,
        );

        if self.capabilities.search {
            payload.search = inputs
                .search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from);
        }
        if self.capabilities.sort {
            payload.sort_key = inputs.sort_key.map(String::from);
        }

        Some(payload)
    }

    /// Export-flavoured derivation: same filters, page pinned to 1, marker set.
    #[must_use]
    pub fn derive_export(&self, inputs: &DeriveInputs<'_>, format: ExportFormat) -> Option<QueryPayload> {
        let pinned = DeriveInputs { page: 1, ..*inputs };
        self.derive(&pinned).map(|mut payload| {
            payload.export_marker = Some(format);
            payload
        })
    }

    /// Memoized derivation.
    ///
    /// Returns the previously shared payload when the new derivation is
    /// value-equal to it, so downstream consumers see a referentially stable
    /// `Arc` across no-op re-evaluations.
    pub fn derive_shared(&mut self, inputs: &DeriveInputs<'_>) -> Option<Arc<QueryPayload>> {
        let Some(fresh) = self.derive(inputs) else {
            tracing::trace!(missing = ?self.gate.missing(inputs.filters), "inputs not ready");
            return None;
        };

        match &self.last {
            Some(last) if **last == fresh => Some(Arc::clone(last)),
            _ => {
                let shared = Arc::new(fresh);
                tracing::debug!(page = shared.page, page_size = shared.page_size, "payload re-derived");
                self.last = Some(Arc::clone(&shared));
                Some(shared)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FilterValue;

    fn deriver(capabilities: Capabilities) -> PayloadDeriver {
        PayloadDeriver::new(
            ReadinessGate::new([names::TENANT, names::START, names::END]),
            [names::CATEGORY],
            capabilities,
        )
    }

    fn ready_filters() -> FilterState {
        [
            (names::TENANT, "T1"),
            (names::START, "2024-01-01"),
            (names::END, "2024-01-31"),
        ]
        .into_iter()
        .collect()
    }

    fn inputs(filters: &FilterState) -> DeriveInputs<'_> {
        DeriveInputs {
            filters,
            page: 1,
            page_size: 10,
            search: None,
            sort_key: None,
        }
    }

    #[test]
    fn not_ready_derives_nothing() {
        let mut d = deriver(Capabilities::default());
        let filters: FilterState = [(names::TENANT, "T1")].into_iter().collect();
        assert!(d.derive(&inputs(&filters)).is_none());
        assert!(d.derive_shared(&inputs(&filters)).is_none());
    }

    #[test]
    fn derivation_is_idempotent() {
        let d = deriver(Capabilities::default());
        let filters = ready_filters();
        assert_eq!(d.derive(&inputs(&filters)), d.derive(&inputs(&filters)));
    }

    #[test]
    fn shared_payload_is_referentially_stable() {
        let mut d = deriver(Capabilities::default());
        let mut filters = ready_filters();
        let first = d.derive_shared(&inputs(&filters)).unwrap();

        // Untracked filter: same payload, same allocation.
        filters.set("columnLayout", "compact");
        let second = d.derive_shared(&inputs(&filters)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        filters.set(names::CATEGORY, "bots");
        let third = d.derive_shared(&inputs(&filters)).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.filters.get(names::CATEGORY), Some(&FilterValue::from("bots")));
    }

    #[test]
    fn optional_fields_follow_capabilities() {
        let mut filters = ready_filters();
        filters.set(names::EVENT_TYPE, "click");
        filters.set(names::CONVERSION_DATE, true);

        let plain = deriver(Capabilities::default()).derive(&inputs(&filters)).unwrap();
        assert!(!plain.filters.contains_key(names::EVENT_TYPE));
        assert!(!plain.filters.contains_key(names::CONVERSION_DATE));

        let rich = deriver(Capabilities {
            event_type: true,
            conversion_date: true,
            ..Capabilities::default()
        })
        .derive(&inputs(&filters))
        .unwrap();
        assert_eq!(rich.filters.get(names::EVENT_TYPE), Some(&FilterValue::from("click")));
        assert_eq!(rich.filters.get(names::CONVERSION_DATE), Some(&FilterValue::Flag(true)));
    }

    #[test]
    fn search_and_sort_require_capabilities() {
        let filters = ready_filters();
        let with_extras = DeriveInputs {
            search: Some("  acme "),
            sort_key: Some("revenue"),
            ..inputs(&filters)
        };

        let plain = deriver(Capabilities::default()).derive(&with_extras).unwrap();
        assert_eq!(plain.search, None);
        assert_eq!(plain.sort_key, None);

        let listing = deriver(Capabilities::listing()).derive(&with_extras).unwrap();
        assert_eq!(listing.search.as_deref(), Some("acme"));
        assert_eq!(listing.sort_key.as_deref(), Some("revenue"));
    }

    #[test]
    fn export_payload_pins_page_and_sets_marker() {
        let d = deriver(Capabilities::default());
        let filters = ready_filters();
        let on_page_four = DeriveInputs { page: 4, ..inputs(&filters) };

        let export = d.derive_export(&on_page_four, ExportFormat::Csv).unwrap();
        assert_eq!(export.page, 1);
        assert_eq!(export.export_marker, Some(ExportFormat::Csv));
        assert_eq!(export.filters, d.derive(&on_page_four).unwrap().filters);
    }
}
