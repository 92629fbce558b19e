//! Filter values and the per-screen filter state.
//!
//! A [`FilterState`] is the set of user-chosen filter inputs for one screen
//! (tenant, date range, category, ...). It is mutated only by explicit user
//! actions and is ordered by name so that two states with the same content are
//! structurally equal and serialize identically.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Well-known filter names shared by the dashboard screens.
pub mod names {
    /// Selected tenant identifier.
    pub const TENANT: &str = "tenant";
    /// Inclusive start of the reporting window.
    pub const START: &str = "start";
    /// Inclusive end of the reporting window.
    pub const END: &str = "end";
    /// Event-type filter (only on screens with the event-type capability).
    pub const EVENT_TYPE: &str = "eventType";
    /// Conversion-date flag (only on screens with the conversion-date capability).
    pub const CONVERSION_DATE: &str = "conversionDate";
    /// Publisher / view key used by drill-down screens.
    pub const VIEW_KEY: &str = "viewKey";
    /// Fraud category used by the sub-category drill-down.
    pub const CATEGORY: &str = "category";
    /// Country selection used by geo configuration.
    pub const COUNTRIES: &str = "countries";
    /// Rule or list status filter.
    pub const STATUS: &str = "status";
}

/// A single filter value.
///
/// Serialized untagged so that a payload reads like the request body the
/// backend expects (`"tenant": "T1"`, `"start": "2024-01-01"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean switch.
    Flag(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Free text or single selection.
    Text(String),
    /// Multi-selection.
    Set(BTreeSet<String>),
}

impl FilterValue {
    /// Returns `true` if the value counts as "present" for readiness purposes.
    ///
    /// Blank text and empty sets are absent; dates and flags are always present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        match self {
            Self::Text(s) => !s.trim().is_empty(),
            Self::Set(s) => !s.is_empty(),
            Self::Date(_) | Self::Flag(_) => true,
        }
    }

    /// Builds a set value from any iterator of strings.
    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Mapping from filter name to value for one screen instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    values: BTreeMap<String, FilterValue>,
}

impl FilterState {
    /// Creates an empty filter state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a filter, returning `true` if the stored value actually changed.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> bool {
        let name = name.into();
        let value = value.into();
        if self.values.get(&name) == Some(&value) {
            return false;
        }
        self.values.insert(name, value);
        true
    }

    /// Removes a filter, returning `true` if it was present.
    pub fn clear(&mut self, name: &str) -> bool {
        self.values.remove(name).is_some()
    }

    /// Value of filter `name`, blank or not.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.values.get(name)
    }

    /// Returns `true` if the named filter holds a present (non-empty) value.
    #[must_use]
    pub fn is_present(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(FilterValue::is_present)
    }

    /// All filters in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a copy restricted to the given names.
    ///
    /// Absent values (blank text, empty sets) are dropped so that clearing a
    /// text box and removing the filter look the same downstream.
    #[must_use]
    pub fn project<'a, I>(&self, names: I) -> BTreeMap<String, FilterValue>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter_map(|name| {
                self.values
                    .get(name)
                    .filter(|v| v.is_present())
                    .map(|v| (name.to_string(), v.clone()))
            })
            .collect()
    }

    /// Number of filters set, blank ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterState
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut state = Self::new();
        for (k, v) in iter {
            state.set(k, v);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_reports_changes_only() {
        let mut filters = FilterState::new();
        assert!(filters.set(names::TENANT, "T1"));
        assert!(!filters.set(names::TENANT, "T1"));
        assert!(filters.set(names::TENANT, "T2"));
        assert!(filters.clear(names::TENANT));
        assert!(!filters.clear(names::TENANT));
    }

    #[test]
    fn blank_values_are_not_present() {
        let mut filters = FilterState::new();
        filters.set(names::TENANT, "   ");
        filters.set(names::COUNTRIES, FilterValue::set(Vec::<String>::new()));
        filters.set(names::CONVERSION_DATE, false);

        assert!(!filters.is_present(names::TENANT));
        assert!(!filters.is_present(names::COUNTRIES));
        assert!(filters.is_present(names::CONVERSION_DATE));
        assert!(!filters.is_present("missing"));
    }

    #[test]
    fn project_keeps_only_named_present_values() {
        let filters: FilterState = [
            (names::TENANT, FilterValue::from("T1")),
            (names::STATUS, FilterValue::from("")),
            ("unrelated", FilterValue::from("x")),
        ]
        .into_iter()
        .collect();

        let projected = filters.project([names::TENANT, names::STATUS]);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected.get(names::TENANT), Some(&FilterValue::from("T1")));
    }

    #[test]
    fn dates_serialize_as_iso_strings() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let json = serde_json::to_value(FilterValue::from(date)).unwrap();
        assert_eq!(json, serde_json::json!("2024-01-31"));
    }
}
