//! Domain layer: the value types every other layer speaks in.
//!
//! Nothing here performs I/O or knows about scheduling. The types are plain,
//! comparable values so that the orchestration layer can decide "did anything
//! change?" with `==`.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`filter`]: Filter values and per-screen filter state
//! - [`payload`]: Immutable request payloads and export formats
//! - [`pagination`]: Page position and backend totals
//! - [`selection`]: Opaque correlation keys for the event bus
//!
//! # Examples
//!
//! ```
//! use dashflow::domain::{FilterState, FilterValue};
//!
//! let mut filters = FilterState::new();
//! assert!(filters.set("tenant", "T1"));
//! assert_eq!(filters.get("tenant"), Some(&FilterValue::from("T1")));
//! ```

pub mod error;
pub mod filter;
pub mod pagination;
pub mod payload;
pub mod selection;

pub use error::{DashflowError, Result};
pub use filter::{names, FilterState, FilterValue};
pub use pagination::PaginationState;
pub use payload::{ExportFormat, QueryPayload};
pub use selection::SelectionKey;
