//! Immutable request payloads.
//!
//! A [`QueryPayload`] is the fully-resolved set of parameters sent to the backend
//! for one logical request. Payloads are compared by value: two payloads are equal
//! iff every field is deep-equal, which is what drives memoization in the deriver
//! and de-duplication in the fetch gates.

use super::filter::FilterValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Export flavour attached to a payload as its `exportMarker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully-resolved request parameters for one listing or export request.
///
/// Serializes with the tracked filters flattened into the top-level object:
///
/// ```
/// use dashflow::domain::{FilterValue, QueryPayload};
/// use std::collections::BTreeMap;
///
/// let mut filters = BTreeMap::new();
/// filters.insert("tenant".to_string(), FilterValue::from("T1"));
/// let payload = QueryPayload::new(filters, 1, 10);
///
/// let json = serde_json::to_value(&payload).unwrap();
/// assert_eq!(json, serde_json::json!({"tenant": "T1", "page": 1, "pageSize": 10}));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPayload {
    /// Tracked filter values, already restricted to what the screen declares.
    #[serde(flatten)]
    pub filters: BTreeMap<String, FilterValue>,

    /// Settled free-text search term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// One-based page index.
    pub page: u32,

    /// Number of rows per page.
    pub page_size: u32,

    /// Column the backend should sort by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,

    /// Present only on export-flavoured payloads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_marker: Option<ExportFormat>,
}

impl QueryPayload {
    /// Builds a payload with no search, sort or export marker.
    #[must_use]
    pub fn new(filters: BTreeMap<String, FilterValue>, page: u32, page_size: u32) -> Self {
        Self {
            filters,
            search: None,
            page,
            page_size,
            sort_key: None,
            export_marker: None,
        }
    }

    /// Returns `true` if this payload asks for an export artifact.
    #[must_use]
    pub const fn is_export(&self) -> bool {
        self.export_marker.is_some()
    }
}
