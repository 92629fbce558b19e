//! Async runtime for one screen.
//!
//! [`ScreenDriver`] pairs a [`ScreenState`] with a [`NetworkCollaborator`] and
//! an [`EventBus`]. It feeds events to [`handle_event`], executes the returned
//! actions, keeps the in-flight requests in a [`FuturesUnordered`], and sleeps
//! until the next response or the next scheduled wake, whichever comes first.
//!
//! The driver is meant for a current-thread tokio runtime: the bus is `Rc`
//! based and the collaborator futures are not required to be `Send`.

use super::collaborator::NetworkCollaborator;
use super::messages::{FetchRequest, FetchResponse};
use crate::app::{handle_event, Action, Event, ScreenState, ScreenView};
use crate::bus::EventBus;
use crate::domain::Result;
use crate::query::ExportKind;
use futures_util::future::LocalBoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use futures_util::FutureExt;
use std::time::Instant;
use tracing::Instrument;

/// Export side effect: kind plus locator or failure message.
type ExportCallback = Box<dyn FnMut(&ExportKind, &str)>;

/// Runs one screen against a network collaborator.
///
/// # Example
///
/// ```
/// use dashflow::app::{Event, ScreenKind};
/// use dashflow::domain::names;
/// use dashflow::network::{FetchRequest, QueryResult, ScreenDriver};
/// use dashflow::{initialize, Config, EventBus};
/// use futures_util::FutureExt;
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let state = initialize(&Config::default(), ScreenKind::RuleConfig).unwrap();
/// let backend = |_: &FetchRequest| async { Ok::<_, String>(QueryResult::default()) }.boxed_local();
/// let mut driver = ScreenDriver::new(state, backend, EventBus::new());
///
/// driver.dispatch(Event::set_filter(names::TENANT, "T1")).unwrap();
/// driver.run_until_idle().await.unwrap();
/// assert!(driver.view().fresh);
/// # });
/// ```
pub struct ScreenDriver<C> {
    state: ScreenState,
    collaborator: C,

    /// Receives `Publish` actions.
    bus: EventBus,

    /// Responses not yet fed back as `FetchCompleted`.
    in_flight: FuturesUnordered<LocalBoxFuture<'static, FetchResponse>>,

    /// Deadline from the latest `ScheduleWake`, if any.
    wake_at: Option<Instant>,

    on_fulfil: ExportCallback,
    on_export_failed: ExportCallback,
}

impl<C: NetworkCollaborator> ScreenDriver<C> {
    /// Wraps `state` with a collaborator and the page's bus.
    ///
    /// Export outcomes are only logged until [`on_fulfil`](Self::on_fulfil)
    /// and [`on_export_failed`](Self::on_export_failed) install real side
    /// effects.
    ///
    /// # Parameters
    ///
    /// * `state` - Screen state, usually from [`crate::initialize`]
    /// * `collaborator` - Issues requests; any `Fn(&FetchRequest) -> LocalBoxFuture` works
    /// * `bus` - Bus shared with the other widgets of the page
    pub fn new(state: ScreenState, collaborator: C, bus: EventBus) -> Self {
        Self {
            state,
            collaborator,
            bus,
            in_flight: FuturesUnordered::new(),
            wake_at: None,
            on_fulfil: Box::new(|kind: &ExportKind, url: &str| tracing::info!(kind = %kind, url = %url, "export ready")),
            on_export_failed: Box::new(|kind: &ExportKind, message: &str| {
                tracing::warn!(kind = %kind, error = %message, "export failed");
            }),
        }
    }

    /// Side effect run once per finished export with the artifact locator.
    #[must_use]
    pub fn on_fulfil<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&ExportKind, &str) + 'static,
    {
        self.on_fulfil = Box::new(callback);
        self
    }

    /// Side effect run when an export ends without an artifact.
    #[must_use]
    pub fn on_export_failed<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&ExportKind, &str) + 'static,
    {
        self.on_export_failed = Box::new(callback);
        self
    }

    /// The driven screen state.
    #[must_use]
    pub const fn state(&self) -> &ScreenState {
        &self.state
    }

    /// Read-only snapshot for rendering.
    #[must_use]
    pub fn view(&self) -> ScreenView<'_> {
        self.state.view()
    }

    /// Number of responses still awaited, superseded ones included.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Instant of the next scheduled [`Event::Tick`], if any.
    #[must_use]
    pub const fn next_wake(&self) -> Option<Instant> {
        self.wake_at
    }

    /// Handles one event at the runtime's current time and executes the resulting actions.
    ///
    /// Any earlier wake is dropped first; the actions reschedule it if a
    /// deadline is still pending. Issued requests start immediately and are
    /// awaited by [`run_until_idle`](Self::run_until_idle).
    ///
    /// # Parameters
    ///
    /// * `event` - Input to apply
    ///
    /// # Returns
    ///
    /// Whether the screen should re-render.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle_event`].
    pub fn dispatch(&mut self, event: Event) -> Result<bool> {
        let now = tokio::time::Instant::now().into_std();
        let (render, actions) = handle_event(&mut self.state, &event, now)?;

        self.wake_at = None;
        for action in actions {
            self.execute(action);
        }
        Ok(render)
    }

    /// Runs until no request is in flight and no wake is scheduled.
    ///
    /// Each completed response is dispatched as [`Event::FetchCompleted`],
    /// each elapsed wake as [`Event::Tick`]. Responses arrive in completion
    /// order, not issue order; stale ones are discarded by the gates.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`handle_event`].
    pub async fn run_until_idle(&mut self) -> Result<()> {
        loop {
            let wake_at = self.wake_at;
            if self.in_flight.is_empty() && wake_at.is_none() {
                return Ok(());
            }

            let event = tokio::select! {
                Some(response) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    Event::FetchCompleted(response)
                }
                () = sleep_until(wake_at), if wake_at.is_some() => Event::Tick,
                else => return Ok(()),
            };
            self.dispatch(event)?;
        }
    }

    /// Tears the screen down. Responses still in flight are dropped unseen.
    pub fn teardown(&mut self) {
        if let Err(e) = self.dispatch(Event::Teardown) {
            tracing::debug!(error = %e, "teardown failed");
        }
        self.in_flight = FuturesUnordered::new();
    }

    fn execute(&mut self, action: Action) {
        match action {
            Action::Issue(request) => self.issue(request),
            Action::FulfillExport { kind, url } => (self.on_fulfil)(&kind, &url),
            Action::ExportFailed { kind, message } => (self.on_export_failed)(&kind, &message),
            Action::ScheduleWake { at } => self.wake_at = Some(at),
            Action::Publish { channel, key } => {
                self.bus.publish(channel, &key);
            }
        }
    }

    fn issue(&mut self, request: FetchRequest) {
        let _parent = request.trace_context.as_ref().and_then(|context| context.attach());
        let span = tracing::debug_span!("fetch", request_id = %request.id, origin = %request.origin);

        let id = request.id;
        let call = span.in_scope(|| self.collaborator.issue(&request));
        let response = async move { FetchResponse::from((id, call.await)) }.instrument(span);
        self.in_flight.push(response.boxed_local());
    }
}

async fn sleep_until(at: Option<Instant>) {
    if let Some(at) = at {
        tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await;
    }
}
