//! Side effects requested by the screen handler.
//!
//! [`handle_event`](super::handle_event) never performs I/O. It returns a
//! `Vec<Action>` and the runtime (normally [`ScreenDriver`]) executes them in
//! order.
//!
//! [`ScreenDriver`]: crate::network::ScreenDriver

use crate::bus::Channel;
use crate::domain::SelectionKey;
use crate::network::FetchRequest;
use crate::query::ExportKind;
use std::time::Instant;

/// Side effect returned by [`handle_event`](super::handle_event).
///
/// Executing an action never mutates [`ScreenState`](super::ScreenState)
/// directly; results come back as new events.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send a request to the network collaborator and feed the response back
    /// as [`Event::FetchCompleted`](super::Event::FetchCompleted).
    Issue(FetchRequest),

    /// An export artifact is ready. Emitted exactly once per export episode.
    FulfillExport {
        kind: ExportKind,
        /// Artifact locator to hand to the download side effect.
        url: String,
    },

    /// An export episode ended without an artifact.
    ExportFailed { kind: ExportKind, message: String },

    /// Deliver [`Event::Tick`](super::Event::Tick) no later than `at`.
    ///
    /// Emitted after every event while a debounce or export re-poll deadline
    /// is pending. Supersedes any wake scheduled earlier.
    ScheduleWake { at: Instant },

    /// Publish a selection on the cross-widget bus.
    Publish { channel: Channel, key: SelectionKey },
}
