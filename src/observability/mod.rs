//! OpenTelemetry tracing with a local file exporter.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → SDK provider → FileSpanExporter → dashflow-otlp.json
//! ```
//!
//! Spans are written as OTLP JSON lines to a size-rotated file (10 MB, three
//! backups) in the data directory. Nothing is sent over the network.
//!
//! - [`init`]: Subscriber setup
//! - `tracer`: Provider with the file exporter
//! - `span_formatter`: OTLP JSON encoding
//! - `file_writer`: Rotating file

mod file_writer;
pub mod init;
mod span_formatter;
mod tracer;

pub use init::{init_tracing, TRACE_FILE};
