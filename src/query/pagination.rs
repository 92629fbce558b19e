//! Pagination/reset coordination.
//!
//! The coordinator watches the inputs that invalidate the current page (tracked
//! filters, the settled search term, the page size) and snaps `page` back to 1
//! when any of them changes. It runs before payload derivation, so the payload
//! built after a filter change never carries the stale page index.

use crate::domain::{DashflowError, FilterState, FilterValue, PaginationState, Result};
use std::collections::BTreeMap;

/// Borrowed snapshot of the inputs that reset pagination.
#[derive(Debug, Clone, Copy)]
pub struct ResetTriggers<'a> {
    /// Current filter inputs.
    pub filters: &'a FilterState,

    /// Filter names whose change resets the page. Others are ignored.
    pub tracked: &'a [String],

    /// Settled search term, after capability filtering.
    pub search: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    filters: BTreeMap<String, FilterValue>,
    search: Option<String>,
    page_size: u32,
}

/// Owns the page state of one listing and resets it when its inputs change.
///
/// Page requests are clamped to the known page count once the backend has
/// reported totals; before that any page of at least 1 is accepted.
#[derive(Debug, Clone)]
pub struct PaginationCoordinator {
    state: PaginationState,

    /// Set by the first [`apply_totals`](Self::apply_totals).
    totals_known: bool,

    /// Trigger values from the previous [`observe`](Self::observe).
    last_seen: Option<Fingerprint>,
}

impl PaginationCoordinator {
    /// Starts on page 1 with `page_size` rows per page and unknown totals.
    ///
    /// # Errors
    ///
    /// Returns [`DashflowError::InvalidPageSize`] if `page_size` is zero.
    pub fn new(page_size: u32) -> Result<Self> {
        Ok(Self {
            state: PaginationState::new(page_size)?,
            totals_known: false,
            last_seen: None,
        })
    }

    /// Copy of page, page size and totals.
    #[must_use]
    pub const fn state(&self) -> PaginationState {
        self.state
    }

    /// Current one-based page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.state.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.state.page_size
    }

    /// Compares the triggers with the last observation and resets `page` to 1
    /// on any difference.
    ///
    /// The first observation just records a baseline, and a reset while
    /// already on page 1 is a no-op, so observing never feeds back into
    /// itself.
    ///
    /// # Parameters
    ///
    /// * `triggers` - Tracked filters and settled search as of this event
    ///
    /// # Returns
    ///
    /// `true` only if the page index actually moved.
    pub fn observe(&mut self, triggers: &ResetTriggers<'_>) -> bool {
        let fingerprint = Fingerprint {
            filters: triggers.filters.project(triggers.tracked.iter().map(String::as_str)),
            search: triggers.search.map(String::from),
            page_size: self.state.page_size,
        };

        let changed = self.last_seen.as_ref().is_some_and(|last| *last != fingerprint);
        self.last_seen = Some(fingerprint);

        if changed {
            return self.reset_page();
        }
        false
    }

    /// Moves to `page`, clamped to `1..=total_pages` once totals are known.
    ///
    /// Returns `true` if the page changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let mut target = page.max(1);
        if self.totals_known {
            target = target.min(self.state.total_pages);
        }
        if target == self.state.page {
            return false;
        }
        tracing::debug!(from = self.state.page, to = target, "page changed");
        self.state.page = target;
        true
    }

    /// Changes the page size and resets to page 1.
    ///
    /// Returns `Ok(true)` if anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`DashflowError::InvalidPageSize`] if `page_size` is zero.
    pub fn set_page_size(&mut self, page_size: u32) -> Result<bool> {
        if page_size == 0 {
            return Err(DashflowError::InvalidPageSize(page_size));
        }
        if page_size == self.state.page_size {
            return Ok(false);
        }
        tracing::debug!(from = self.state.page_size, to = page_size, "page size changed");
        self.state.page_size = page_size;
        if let Some(last) = self.last_seen.as_mut() {
            last.page_size = page_size;
        }
        if self.totals_known {
            self.state.total_pages = PaginationState::pages_for(self.state.total_records, page_size);
        }
        self.reset_page();
        Ok(true)
    }

    /// Records the total row count reported by the backend.
    ///
    /// Recomputes `total_pages` for the current page size. The page itself is
    /// left alone; the next [`set_page`](Self::set_page) is clamped.
    pub fn apply_totals(&mut self, total_records: u64) {
        self.state.total_records = total_records;
        self.state.total_pages = PaginationState::pages_for(total_records, self.state.page_size);
        self.totals_known = true;
    }

    fn reset_page(&mut self) -> bool {
        if self.state.page == 1 {
            return false;
        }
        tracing::debug!(from = self.state.page, "resetting page after input change");
        self.state.page = 1;
        true
    }
}
