//! Read-only snapshot for presentation layers.

use super::screen::ScreenKind;
use super::state::ScreenState;
use crate::domain::{DashflowError, PaginationState, QueryPayload, Result};
use crate::network::QueryResult;
use crate::query::ExportKind;

/// Everything a table, chart or export button needs to render one screen.
#[derive(Debug, Clone)]
pub struct ScreenView<'a> {
    /// Screen the view was taken from.
    pub kind: ScreenKind,

    /// All required inputs are set. When `false`, show a prompt instead of a table.
    pub ready: bool,

    /// Required inputs still missing, in declaration order.
    pub missing: Vec<&'a str>,

    /// Listing payload the current data was (or will be) fetched for.
    pub payload: Option<&'a QueryPayload>,

    /// Last good listing result.
    pub data: Option<&'a QueryResult>,

    /// A listing request is outstanding; show a spinner.
    pub pending: bool,

    /// `false` while `data` belongs to an earlier payload.
    pub fresh: bool,

    /// Failure message of the latest listing request.
    pub error: Option<&'a str>,

    /// Page controls: page, page size and backend totals.
    pub pagination: PaginationState,

    /// Search box contents, echoed back before they settle.
    pub search_input: &'a str,

    /// Export kinds whose button should show progress.
    pub exporting: Vec<&'a ExportKind>,
}

impl<'a> ScreenView<'a> {
    /// Borrows a view of `state`.
    #[must_use]
    pub fn of(state: &'a ScreenState) -> Self {
        let listing = state.listing().snapshot();
        Self {
            kind: state.kind(),
            ready: state.is_ready(),
            missing: state.deriver.gate().missing(state.filters()),
            payload: state.payload().map(|payload| &**payload),
            data: listing.data,
            pending: listing.pending,
            fresh: listing.fresh,
            error: listing.error,
            pagination: state.pagination(),
            search_input: state.search_input(),
            exporting: state.exports().exporting().collect(),
        }
    }

    /// Rows to display. Empty until the first result arrives.
    #[must_use]
    pub fn rows(&self) -> &'a [serde_json::Value] {
        self.data.map(|data| data.rows.as_slice()).unwrap_or(&[])
    }

    /// The listing outcome as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`DashflowError::Network`] when the latest listing request
    /// failed, even if older data is still available in `data`.
    pub fn result(&self) -> Result<Option<&'a QueryResult>> {
        match self.error {
            Some(message) => Err(DashflowError::Network(message.to_string())),
            None => Ok(self.data),
        }
    }

    #[must_use]
    pub fn is_exporting(&self, kind: &ExportKind) -> bool {
        self.exporting.contains(&kind)
    }
}

impl ScreenState {
    /// Read-only snapshot for rendering. See [`ScreenView`].
    #[must_use]
    pub fn view(&self) -> ScreenView<'_> {
        ScreenView::of(self)
    }
}
