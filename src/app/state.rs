//! Per-screen state.
//!
//! [`ScreenState`] owns every piece of orchestration state for one screen
//! instance: the filter inputs, the search debouncer, the pagination
//! coordinator, the listing gate and the export jobs. It is built from a
//! [`ScreenDescriptor`] so all screens share one implementation.
//!
//! The only way to mutate it from outside is
//! [`handle_event`](super::handle_event); the accessors here are read-only
//! and feed [`ScreenView`](super::ScreenView).

use super::actions::Action;
use super::screen::{ScreenDescriptor, ScreenKind};
use crate::domain::{FilterState, PaginationState, QueryPayload, Result};
use crate::network::RequestOrigin;
use crate::query::{
    Debouncer, DeriveInputs, ExportKind, ExportLauncher, FetchDescriptor, FetchGate, GateDecision, PaginationCoordinator,
    PayloadDeriver, ReadinessGate, RequestSequence, ResetTriggers,
};
use crate::Config;
use std::sync::Arc;
use std::time::Instant;

/// Orchestration state for one screen instance.
///
/// Created by [`ScreenState::new`] (or [`crate::initialize`]) and mutated only
/// through [`handle_event`](super::handle_event). Payloads are shared
/// through `Arc`, so clones stay cheap.
#[derive(Debug, Clone)]
pub struct ScreenState {
    /// Static description of the screen: required filters, exports, channel.
    pub(super) descriptor: ScreenDescriptor,

    /// Current filter inputs, tracked or not.
    pub(super) filters: FilterState,

    /// Search text exactly as typed, before debouncing.
    pub(super) search_input: String,

    /// Coalesces `search_input` into a settled term after the quiet window.
    pub(super) search: Debouncer<String>,

    /// Column to sort by, if the user picked one.
    pub(super) sort_key: Option<String>,

    /// Listing enable flag. Exports ignore it.
    pub(super) enabled: bool,

    /// Readiness gate plus payload projection for this screen.
    pub(super) deriver: PayloadDeriver,

    /// Page index, page size and totals, with reset-on-change.
    pub(super) pagination: PaginationCoordinator,

    /// Gate for the main listing query.
    pub(super) listing: FetchGate,

    /// One export job per declared export kind.
    pub(super) exports: ExportLauncher,

    /// Request id allocator shared by the listing and every export job.
    pub(super) ids: RequestSequence,

    /// Listing payload derived by the last [`reconcile`](Self::reconcile).
    payload: Option<Arc<QueryPayload>>,

    torn_down: bool,
}

impl ScreenState {
    /// Builds the state for `kind` with the timing and page size from `config`.
    ///
    /// Nothing is derived or issued yet. The first handled event runs the
    /// initial reconcile.
    ///
    /// # Parameters
    ///
    /// * `kind` - Screen whose descriptor drives readiness, tracking and exports
    /// * `config` - Source of the debounce window, default page size and export poll interval
    ///
    /// # Errors
    ///
    /// Returns [`DashflowError::InvalidPageSize`](crate::DashflowError::InvalidPageSize)
    /// if the configured default page size is zero.
    pub fn new(kind: ScreenKind, config: &Config) -> Result<Self> {
        let descriptor = kind.descriptor();
        let deriver = PayloadDeriver::new(
            ReadinessGate::new(descriptor.required.iter().copied()),
            descriptor.extra_filters.iter().copied(),
            descriptor.capabilities,
        );
        let exports = ExportLauncher::new(
            descriptor
                .exports
                .iter()
                .map(|(kind, format)| (ExportKind::from(*kind), *format)),
            config.export_poll_interval(),
        );

        tracing::debug!(
            screen = %kind,
            tracked = ?deriver.tracked(),
            page_size = config.default_page_size,
            "screen state created"
        );

        Ok(Self {
            descriptor,
            filters: FilterState::new(),
            search_input: String::new(),
            search: Debouncer::new(config.debounce_quiet()),
            sort_key: None,
            enabled: true,
            deriver,
            pagination: PaginationCoordinator::new(config.default_page_size)?,
            listing: FetchGate::new(RequestOrigin::Listing),
            exports,
            ids: RequestSequence::default(),
            payload: None,
            torn_down: false,
        })
    }

    /// The screen this state was built for.
    #[must_use]
    pub const fn kind(&self) -> ScreenKind {
        self.descriptor.kind
    }

    #[must_use]
    pub const fn descriptor(&self) -> &ScreenDescriptor {
        &self.descriptor
    }

    /// Current filter inputs, including untracked ones.
    #[must_use]
    pub const fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// The listing payload as of the last handled event.
    ///
    /// `None` while required filters are missing, on screens without a
    /// listing, and after teardown.
    #[must_use]
    pub fn payload(&self) -> Option<&Arc<QueryPayload>> {
        self.payload.as_ref()
    }

    /// Whether every required filter currently holds a non-blank value.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.deriver.gate().is_ready(&self.filters)
    }

    /// Whether an export of `kind` has been requested and not yet finished.
    ///
    /// Always `false` for kinds the screen does not declare.
    #[must_use]
    pub fn is_exporting(&self, kind: &ExportKind) -> bool {
        self.exports.is_exporting(kind)
    }

    /// Copy of the current page, page size and totals.
    #[must_use]
    pub const fn pagination(&self) -> PaginationState {
        self.pagination.state()
    }

    /// The listing gate, for pending/fresh/error inspection.
    #[must_use]
    pub const fn listing(&self) -> &FetchGate {
        &self.listing
    }

    /// Export jobs of this screen.
    #[must_use]
    pub const fn exports(&self) -> &ExportLauncher {
        &self.exports
    }

    /// Raw, unsettled search text as typed.
    #[must_use]
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Search term as of the last elapsed quiet window.
    #[must_use]
    pub fn settled_search(&self) -> Option<&str> {
        self.search.settled().map(String::as_str)
    }

    /// `true` once [`Event::Teardown`](super::Event::Teardown) was handled.
    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Earliest instant at which a pending deadline needs a tick.
    #[must_use]
    pub fn next_wake(&self) -> Option<Instant> {
        match (self.search.deadline(), self.exports.next_wake()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Settles the debounced search if its window has elapsed.
    ///
    /// Returns `true` if the settled term changed.
    pub(super) fn poll_search(&mut self, now: Instant) -> bool {
        let before = self.search.settled().cloned();
        match self.search.poll(now) {
            Some(settled) => {
                tracing::debug!(search = %settled, "search settled");
                before.as_ref() != Some(&settled)
            }
            None => false,
        }
    }

    /// Runs reset, derivation and gating against the current inputs.
    ///
    /// Order matters: the page is reset before the payload is derived, so a
    /// payload never pairs new filters with a stale page index.
    ///
    /// # Parameters
    ///
    /// * `now` - Current instant, used for export re-poll deadlines
    ///
    /// # Returns
    ///
    /// `Issue` actions for the listing and any export gate that needs a
    /// request, followed by at most one `ScheduleWake` for the earliest
    /// pending deadline.
    pub(super) fn reconcile(&mut self, now: Instant) -> Vec<Action> {
        let mut actions = Vec::new();
        let settled = self.search.settled().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let search = settled.as_deref().filter(|_| self.descriptor.capabilities.search);

        self.pagination.observe(&ResetTriggers {
            filters: &self.filters,
            tracked: self.deriver.tracked(),
            search,
        });

        let inputs = DeriveInputs {
            filters: &self.filters,
            page: self.pagination.page(),
            page_size: self.pagination.page_size(),
            search,
            sort_key: self.sort_key.as_deref(),
        };

        self.payload = if self.descriptor.listing {
            self.deriver.derive_shared(&inputs)
        } else {
            None
        };

        let descriptor = FetchDescriptor::new(self.payload.clone(), self.enabled);
        if let GateDecision::Issue(request) = self.listing.execute(&descriptor, &mut self.ids) {
            actions.push(Action::Issue(request));
        }

        actions.extend(
            self.exports
                .reconcile(&self.deriver, &inputs, &mut self.ids, now)
                .into_iter()
                .map(Action::Issue),
        );

        if let Some(at) = self.next_wake() {
            actions.push(Action::ScheduleWake { at });
        }
        actions
    }

    /// Drops every pending deadline and outstanding request. Irreversible.
    pub(super) fn teardown(&mut self) {
        tracing::debug!(screen = %self.descriptor.kind, "screen torn down");
        self.search.cancel();
        self.exports.cancel_all();
        self.listing.reset();
        self.payload = None;
        self.torn_down = true;
    }
}
