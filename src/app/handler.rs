//! Event handling for one screen.
//!
//! Every input to a screen arrives as an [`Event`]: user edits, timer ticks,
//! network completions, teardown. [`handle_event`] applies the event to
//! [`ScreenState`], re-runs reset, derivation and gating, and returns the
//! side effects as [`Action`]s. Because `now` is an argument, the handler is
//! fully deterministic and is tested without a runtime.
//!
//! ```text
//! Event → mutate inputs → reset page → derive payload → gates → Vec<Action>
//!   ↑                                                              │
//!   └──────────────── FetchCompleted / Tick ◄── runtime ◄──────────┘
//! ```

use super::actions::Action;
use super::state::ScreenState;
use crate::domain::{DashflowError, FilterValue, Result, SelectionKey};
use crate::network::FetchResponse;
use crate::query::{ExportKind, ExportOutcome, Resolution};
use std::time::Instant;

/// Inputs to a screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Sets a filter input.
    SetFilter { name: String, value: FilterValue },
    /// Removes a filter input.
    ClearFilter { name: String },
    /// Raw search text as typed. Settles after the quiet window.
    SearchInput(String),
    /// A scheduled deadline may have passed.
    Tick,
    /// Moves to a page. Clamped to `1..=total_pages` once totals are known.
    SetPage(u32),
    /// Changes rows per page and returns to page 1. Zero is rejected.
    SetPageSize(u32),
    SetSort(Option<String>),
    /// Enables or disables the listing query (e.g. the screen is hidden).
    SetEnabled(bool),
    /// Starts an export. Ignored while the same kind is still running.
    RequestExport(ExportKind),
    /// Re-issues the listing query for the current payload, typically after
    /// a mutation on a configuration screen.
    Refresh,
    /// The network collaborator answered a request.
    FetchCompleted(FetchResponse),
    /// A table row was clicked.
    RowActivated(SelectionKey),
    /// The screen is going away. Nothing fires afterwards.
    Teardown,
}

impl Event {
    /// Shorthand for [`Event::SetFilter`].
    pub fn set_filter(name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::SetFilter {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Processes one event and returns `(should_render, actions)`.
///
/// Before the event itself is applied, an elapsed search debounce is settled,
/// so a `Tick` is only needed when nothing else happens in between.
///
/// # Parameters
///
/// * `state` - The screen to update
/// * `event` - The input to apply
/// * `now` - Current instant; the only clock the handler reads
///
/// # Returns
///
/// `should_render` is `true` when anything visible changed. `actions` are the
/// side effects to execute in order.
///
/// # Errors
///
/// Returns [`DashflowError::InvalidPageSize`](crate::DashflowError::InvalidPageSize)
/// for `SetPageSize(0)`. State is left unchanged in that case.
pub fn handle_event(state: &mut ScreenState, event: &Event, now: Instant) -> Result<(bool, Vec<Action>)> {
    let _span = tracing::debug_span!("handle_event", screen = %state.kind(), event = ?event).entered();

    if state.is_torn_down() {
        tracing::debug!("event after teardown ignored");
        return Ok((false, vec![]));
    }
    if let Event::SetPageSize(0) = event {
        return Err(DashflowError::InvalidPageSize(0));
    }

    let mut render = state.poll_search(now);
    let mut actions = Vec::new();

    match event {
        Event::SetFilter { name, value } => {
            render |= state.filters.set(name.clone(), value.clone());
        }
        Event::ClearFilter { name } => {
            render |= state.filters.clear(name);
        }
        Event::SearchInput(raw) => {
            tracing::trace!(raw = %raw, "search keystroke");
            state.search_input.clone_from(raw);
            state.search.on_change(raw.clone(), now);
            render = true;
        }
        Event::Tick => {}
        Event::SetPage(page) => {
            render |= state.pagination.set_page(*page);
        }
        Event::SetPageSize(page_size) => {
            render |= state.pagination.set_page_size(*page_size)?;
        }
        Event::SetSort(sort_key) => {
            if state.sort_key != *sort_key {
                state.sort_key.clone_from(sort_key);
                render = true;
            }
        }
        Event::SetEnabled(enabled) => {
            if state.enabled != *enabled {
                tracing::debug!(enabled, "listing enable flag changed");
                state.enabled = *enabled;
                render = true;
            }
        }
        Event::RequestExport(kind) => {
            render |= state.exports.request_export(kind);
        }
        Event::Refresh => {
            state.listing.refresh();
        }
        Event::FetchCompleted(response) => {
            render |= apply_response(state, response, now, &mut actions);
        }
        Event::RowActivated(key) => match state.descriptor.detail_channel {
            Some(channel) => actions.push(Action::Publish {
                channel,
                key: key.clone(),
            }),
            None => tracing::debug!(key = %key, "screen has no detail channel"),
        },
        Event::Teardown => {
            state.teardown();
            return Ok((false, vec![]));
        }
    }

    let follow_up = state.reconcile(now);
    render |= follow_up.iter().any(|action| matches!(action, Action::Issue(_)));
    actions.extend(follow_up);

    Ok((render, actions))
}

fn apply_response(state: &mut ScreenState, response: &FetchResponse, now: Instant, actions: &mut Vec<Action>) -> bool {
    if state.exports.owns(response) {
        return match state.exports.resolve(response.clone(), now) {
            Some(ExportOutcome::Fulfilled { kind, url }) => {
                actions.push(Action::FulfillExport { kind, url });
                true
            }
            Some(ExportOutcome::Failed { kind, message }) => {
                actions.push(Action::ExportFailed { kind, message });
                true
            }
            Some(ExportOutcome::Incomplete { .. }) | None => false,
        };
    }

    match state.listing.resolve(response.clone()) {
        Resolution::Applied => {
            if let Some(total) = state.listing.data().and_then(|data| data.total_records) {
                state.pagination.apply_totals(total);
            }
            true
        }
        Resolution::Failed(_) => true,
        Resolution::Discarded => false,
    }
}
