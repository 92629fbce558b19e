//! Network boundary.
//!
//! - [`messages`]: Request/response envelopes with trace context propagation
//! - [`collaborator`]: The contract a transport implements
//! - [`driver`]: Async runtime that runs one screen against a collaborator

pub mod collaborator;
pub mod driver;
pub mod messages;

pub use collaborator::NetworkCollaborator;
pub use driver::ScreenDriver;
pub use messages::{
    ExportStatus, FetchOutcome, FetchRequest, FetchResponse, QueryResult, RequestId, RequestOrigin, TraceContext,
};
