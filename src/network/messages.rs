//! Request and response envelopes exchanged with the network collaborator.
//!
//! Every request carries the [`RequestId`] it was issued under so responses can
//! be correlated with the gate that is waiting for them, plus an optional
//! [`TraceContext`] linking the collaborator's spans to the span that issued
//! the request.

use crate::domain::QueryPayload;
use crate::query::ExportKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Distributed tracing context captured when a request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceContext {
    /// OpenTelemetry trace ID as a hex string.
    pub trace_id: String,

    /// Span ID of the issuing span.
    pub parent_span_id: String,
}

impl TraceContext {
    /// Captures the trace and span IDs of the active span.
    ///
    /// Returns `None` if the current span context is invalid, which is the
    /// case whenever tracing has not been initialized.
    pub fn from_current() -> Option<Self> {
        use opentelemetry::trace::TraceContextExt;
        use tracing_opentelemetry::OpenTelemetrySpanExt;

        let span = tracing::Span::current();
        let otel_context = span.context();
        let span_ref = otel_context.span();
        let span_context = span_ref.span_context();

        if !span_context.is_valid() {
            return None;
        }

        Some(Self {
            trace_id: format!("{:032x}", span_context.trace_id()),
            parent_span_id: format!("{:016x}", span_context.span_id()),
        })
    }

    /// Makes this context the remote parent of spans created while the guard lives.
    pub fn attach(&self) -> Option<opentelemetry::ContextGuard> {
        use opentelemetry::trace::{SpanContext, SpanId, TraceContextExt, TraceFlags, TraceId, TraceState};

        let trace_id = TraceId::from_hex(&self.trace_id).ok()?;
        let span_id = SpanId::from_hex(&self.parent_span_id).ok()?;

        let span_context = SpanContext::new(trace_id, span_id, TraceFlags::SAMPLED, true, TraceState::default());
        let otel_context = opentelemetry::Context::current().with_remote_span_context(span_context);

        Some(otel_context.attach())
    }
}

/// Identifier of one issued request, unique per screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which gate issued a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "origin")]
pub enum RequestOrigin {
    /// The screen's main listing query.
    Listing,
    /// An export job of the given kind.
    Export { kind: ExportKind },
}

impl fmt::Display for RequestOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing => f.write_str("listing"),
            Self::Export { kind } => write!(f, "export:{kind}"),
        }
    }
}

/// One request handed to the [`NetworkCollaborator`](super::NetworkCollaborator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// Correlates the response with the gate that issued the request.
    pub id: RequestId,
    /// Listing or export job that issued the request.
    pub origin: RequestOrigin,
    /// Parameters to send to the backend.
    pub payload: Arc<QueryPayload>,

    /// Context of the span that issued the request, if tracing is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_context: Option<TraceContext>,
}

impl FetchRequest {
    /// Builds a request and attaches the current trace context.
    pub fn new(id: RequestId, origin: RequestOrigin, payload: Arc<QueryPayload>) -> Self {
        Self {
            id,
            origin,
            payload,
            trace_context: TraceContext::from_current(),
        }
    }

    /// `true` for requests issued by an export job.
    #[must_use]
    pub const fn is_export(&self) -> bool {
        matches!(self.origin, RequestOrigin::Export { .. })
    }
}

/// Job status some export backends report alongside the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Pending,
    Ready,
    Failed,
}

/// Backend result for a listing or export request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResult {
    /// Rows of the requested page, as the backend sent them.
    pub rows: Vec<serde_json::Value>,

    /// Total rows across all pages, when the backend reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<u64>,

    /// Location of a generated export artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_url: Option<String>,

    /// Explicit job status. `failed` overrides a present locator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExportStatus>,

    /// Human-readable detail, mostly set alongside a failed status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryResult {
    /// The artifact locator, if present and non-blank.
    #[must_use]
    pub fn artifact_locator(&self) -> Option<&str> {
        self.artifact_url.as_deref().map(str::trim).filter(|url| !url.is_empty())
    }
}

/// What the collaborator produced for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum FetchOutcome {
    Data(QueryResult),
    Error { message: String },
}

/// A collaborator answer, tagged with the request it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResponse {
    pub id: RequestId,
    pub outcome: FetchOutcome,
}

impl FetchResponse {
    /// Successful response.
    #[must_use]
    pub const fn data(id: RequestId, result: QueryResult) -> Self {
        Self {
            id,
            outcome: FetchOutcome::Data(result),
        }
    }

    /// Failed response carrying the collaborator's message.
    pub fn error(id: RequestId, message: impl Into<String>) -> Self {
        Self {
            id,
            outcome: FetchOutcome::Error { message: message.into() },
        }
    }
}

impl From<(RequestId, std::result::Result<QueryResult, String>)> for FetchResponse {
    fn from((id, result): (RequestId, std::result::Result<QueryResult, String>)) -> Self {
        match result {
            Ok(result) => Self::data(id, result),
            Err(message) => Self::error(id, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExportFormat, FilterValue};
    use std::collections::BTreeMap;

    #[test]
    fn blank_locator_is_not_a_locator() {
        let blank = QueryResult {
            artifact_url: Some("   ".to_string()),
            ..QueryResult::default()
        };
        assert_eq!(blank.artifact_locator(), None);
        assert_eq!(QueryResult::default().artifact_locator(), None);
    }

    #[test]
    fn request_serializes_payload_fields_flat() {
        let mut filters = BTreeMap::new();
        filters.insert("tenant".to_string(), FilterValue::from("T1"));
        let mut payload = QueryPayload::new(filters, 1, 10);
        payload.export_marker = Some(ExportFormat::Csv);

        let request = FetchRequest {
            id: RequestId(7),
            origin: RequestOrigin::Export { kind: ExportKind::from("csv") },
            payload: Arc::new(payload),
            trace_context: None,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["origin"]["origin"], "export");
        assert_eq!(json["origin"]["kind"], "csv");
        assert_eq!(json["payload"]["tenant"], "T1");
        assert_eq!(json["payload"]["exportMarker"], "csv");
        assert!(json.get("traceContext").is_none());
    }

    #[test]
    fn result_tolerates_missing_fields() {
        let result: QueryResult = serde_json::from_str(r#"{"artifactUrl":"https://x/y.csv","status":"ready"}"#).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.artifact_locator(), Some("https://x/y.csv"));
        assert_eq!(result.status, Some(ExportStatus::Ready));
    }

    #[test]
    fn untraced_request_has_no_context() {
        let request = FetchRequest::new(RequestId(1), RequestOrigin::Listing, Arc::new(QueryPayload::new(BTreeMap::new(), 1, 10)));
        assert_eq!(request.trace_context, None);
        assert!(!request.is_export());
    }
}
