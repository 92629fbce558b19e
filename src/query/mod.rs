//! Orchestration core for one dashboard screen.
//!
//! Everything in this module is synchronous and deterministic. Time enters as
//! an explicit [`std::time::Instant`] argument, and network traffic leaves as
//! [`FetchRequest`](crate::network::FetchRequest) values for the caller to
//! send. The async runtime lives in [`crate::network::driver`].
//!
//! # Organization
//!
//! - [`readiness`]: Is every required input present?
//! - [`debounce`]: Deadline-based coalescing of free-text input
//! - [`deriver`]: Inputs to immutable payload, with per-screen capabilities
//! - [`pagination`]: Snap back to page 1 when the query changes
//! - [`fetch_gate`]: One request per payload value, last payload wins
//! - [`export`]: Per-kind export jobs with one-shot fulfilment

pub mod debounce;
pub mod deriver;
pub mod export;
pub mod fetch_gate;
pub mod pagination;
pub mod readiness;

pub use debounce::{Debouncer, DEFAULT_QUIET_WINDOW};
pub use deriver::{Capabilities, DeriveInputs, PayloadDeriver};
pub use export::{ExportKind, ExportLauncher, ExportOutcome, DEFAULT_POLL_INTERVAL};
pub use fetch_gate::{FetchDescriptor, FetchGate, GateDecision, GateSnapshot, RequestSequence, Resolution};
pub use pagination::{PaginationCoordinator, ResetTriggers};
pub use readiness::ReadinessGate;
