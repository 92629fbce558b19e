//! Fetch gate: binds a derived payload to enabled execution.
//!
//! A gate issues at most one request per payload value, never issues for an
//! absent payload or while disabled, and applies only the result of the request
//! that matches its current payload. There is no hard cancellation; a
//! superseded request simply has its result discarded when it arrives.

use crate::domain::{DashflowError, QueryPayload, Result};
use crate::network::{FetchOutcome, FetchRequest, FetchResponse, QueryResult, RequestId, RequestOrigin};
use std::sync::Arc;

/// Allocates request identifiers for one screen.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    next: u64,
}

impl RequestSequence {
    /// Allocates the next id. Ids start at 1 and never repeat.
    pub fn next_id(&mut self) -> RequestId {
        self.next += 1;
        RequestId(self.next)
    }
}

/// A payload paired with its enable flag.
///
/// An absent payload is never executable, whatever `enabled` says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchDescriptor {
    /// Derived payload, `None` while the screen is not ready.
    pub payload: Option<Arc<QueryPayload>>,

    /// Caller-controlled switch, e.g. `false` while a widget is hidden.
    pub enabled: bool,
}

impl FetchDescriptor {
    /// Pairs a payload with its enable flag.
    #[must_use]
    pub const fn new(payload: Option<Arc<QueryPayload>>, enabled: bool) -> Self {
        Self { payload, enabled }
    }

    /// `true` when enabled and a payload is present.
    #[must_use]
    pub const fn is_executable(&self) -> bool {
        self.enabled && self.payload.is_some()
    }
}

/// Outcome of [`FetchGate::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// A new request must be sent to the network collaborator.
    Issue(FetchRequest),
    /// The payload is value-equal to the current one; nothing to send.
    Unchanged,
    /// Payload absent or gate disabled; nothing was or will be sent.
    Suppressed,
}

/// Outcome of [`FetchGate::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The result matched the current payload and is now the gate's data.
    Applied,
    /// The current request failed; previous data is kept.
    Failed(String),
    /// The result belonged to a superseded or unknown request.
    Discarded,
}

/// What a presentation layer may read from a gate.
#[derive(Debug, Clone, Copy)]
pub struct GateSnapshot<'a> {
    /// Last successfully applied result, possibly for an earlier payload.
    pub data: Option<&'a QueryResult>,

    /// A request for the current payload is outstanding.
    pub pending: bool,

    /// `true` only when `data` belongs to the current payload.
    pub fresh: bool,

    /// Message of the failed request for the current payload.
    pub error: Option<&'a str>,
}

impl<'a> GateSnapshot<'a> {
    /// Folds the snapshot into a `Result` for callers that treat a failed
    /// fetch as an error rather than as stale data.
    ///
    /// # Errors
    ///
    /// Returns [`DashflowError::Network`] with the collaborator's message when
    /// the request for the current payload failed. Read `data` directly to
    /// keep showing the last good result instead.
    pub fn result(&self) -> Result<Option<&'a QueryResult>> {
        match self.error {
            Some(message) => Err(DashflowError::Network(message.to_string())),
            None => Ok(self.data),
        }
    }
}

/// Executes one query: the listing of a screen or one of its export jobs.
///
/// A gate remembers the payload it last issued, so re-evaluating an unchanged
/// payload sends nothing. Responses are matched by [`RequestId`]; anything not
/// answering the outstanding request is discarded.
#[derive(Debug, Clone)]
pub struct FetchGate {
    /// Stamped on every request so responses can be routed back.
    origin: RequestOrigin,

    /// Payload of the last issued request.
    current: Option<Arc<QueryPayload>>,

    /// Id of the request whose response would be applied.
    in_flight: Option<RequestId>,

    data: Option<QueryResult>,
    fresh: bool,
    error: Option<String>,
}

impl FetchGate {
    /// Creates an idle gate that stamps `origin` on its requests.
    #[must_use]
    pub const fn new(origin: RequestOrigin) -> Self {
        Self {
            origin,
            current: None,
            in_flight: None,
            data: None,
            fresh: false,
            error: None,
        }
    }

    /// Binds the descriptor's payload to execution.
    ///
    /// An absent payload or a disabled descriptor forgets the current payload,
    /// drops the outstanding request and clears any recorded error; data from
    /// earlier payloads stays readable but is no longer fresh.
    ///
    /// # Parameters
    ///
    /// * `descriptor` - Payload and enable flag as of this reconcile
    /// * `ids` - The screen's request id allocator, advanced only on `Issue`
    ///
    /// # Returns
    ///
    /// * [`GateDecision::Issue`] - the payload differs by value from the current one
    /// * [`GateDecision::Unchanged`] - the same payload was already issued
    /// * [`GateDecision::Suppressed`] - nothing may be sent
    pub fn execute(&mut self, descriptor: &FetchDescriptor, ids: &mut RequestSequence) -> GateDecision {
        let payload = match (&descriptor.payload, descriptor.enabled) {
            (Some(payload), true) => payload,
            _ => {
                if self.current.take().is_some() || self.in_flight.is_some() {
                    tracing::debug!(origin = %self.origin, "gate disabled, outstanding request dropped");
                }
                self.in_flight = None;
                self.fresh = false;
                self.error = None;
                return GateDecision::Suppressed;
            }
        };

        if self.current.as_deref() == Some(payload.as_ref()) {
            return GateDecision::Unchanged;
        }

        let id = ids.next_id();
        if let Some(superseded) = self.in_flight.replace(id) {
            tracing::debug!(origin = %self.origin, superseded = %superseded, "superseding in-flight request");
        }
        self.current = Some(Arc::clone(payload));
        self.fresh = false;
        self.error = None;

        tracing::debug!(origin = %self.origin, request_id = %id, "issuing request");
        GateDecision::Issue(FetchRequest::new(id, self.origin.clone(), Arc::clone(payload)))
    }

    /// Applies a response if it answers the outstanding request.
    ///
    /// A failure keeps the previous data and records the message.
    ///
    /// # Parameters
    ///
    /// * `response` - Collaborator response, matched by request id
    ///
    /// # Returns
    ///
    /// [`Resolution::Applied`] or [`Resolution::Failed`] for the outstanding
    /// request, [`Resolution::Discarded`] for anything else.
    pub fn resolve(&mut self, response: FetchResponse) -> Resolution {
        if self.in_flight != Some(response.id) {
            tracing::debug!(origin = %self.origin, request_id = %response.id, "discarding stale result");
            return Resolution::Discarded;
        }
        self.in_flight = None;

        match response.outcome {
            FetchOutcome::Data(result) => {
                self.data = Some(result);
                self.fresh = true;
                self.error = None;
                Resolution::Applied
            }
            FetchOutcome::Error { message } => {
                tracing::debug!(origin = %self.origin, error = %message, "request failed");
                self.error = Some(message.clone());
                Resolution::Failed(message)
            }
        }
    }

    /// Forces the next [`execute`](Self::execute) to re-issue the current payload.
    pub fn refresh(&mut self) {
        self.current = None;
    }

    /// Forgets everything, including data. Used when a gate's owner goes idle.
    pub fn reset(&mut self) {
        self.current = None;
        self.in_flight = None;
        self.data = None;
        self.fresh = false;
        self.error = None;
    }

    /// Whether `id` is the request this gate is waiting for.
    #[must_use]
    pub fn owns(&self, id: RequestId) -> bool {
        self.in_flight == Some(id)
    }

    /// A request for the current payload is outstanding.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Last applied result, fresh or not.
    #[must_use]
    pub const fn data(&self) -> Option<&QueryResult> {
        self.data.as_ref()
    }

    /// Payload of the last issued request, cleared on suppression.
    #[must_use]
    pub fn current_payload(&self) -> Option<&Arc<QueryPayload>> {
        self.current.as_ref()
    }

    /// Everything a presentation layer may read, borrowed.
    #[must_use]
    pub fn snapshot(&self) -> GateSnapshot<'_> {
        GateSnapshot {
            data: self.data.as_ref(),
            pending: self.in_flight.is_some(),
            fresh: self.fresh,
            error: self.error.as_deref(),
        }
    }
}
