//! Pagination state for a single listing.

use super::error::{DashflowError, Result};
use serde::{Deserialize, Serialize};

/// Current page position and totals reported by the backend.
///
/// Invariants: `page >= 1`, `page_size > 0`, `total_pages >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    /// One-based page index.
    pub page: u32,
    /// Rows per page, never zero.
    pub page_size: u32,
    /// Page count derived from `total_records`; 1 until totals are known.
    pub total_pages: u32,
    /// Row count reported by the backend for the current filters.
    pub total_records: u64,
}

impl PaginationState {
    /// Creates a state on page 1 with no known totals.
    ///
    /// # Errors
    ///
    /// Returns [`DashflowError::InvalidPageSize`] if `page_size` is zero.
    pub const fn new(page_size: u32) -> Result<Self> {
        if page_size == 0 {
            return Err(DashflowError::InvalidPageSize(page_size));
        }
        Ok(Self {
            page: 1,
            page_size,
            total_pages: 1,
            total_records: 0,
        })
    }

    /// Number of pages needed for `total_records` rows at `page_size` rows per page.
    #[must_use]
    pub const fn pages_for(total_records: u64, page_size: u32) -> u32 {
        let size = page_size as u64;
        let pages = total_records.div_ceil(size);
        if pages == 0 {
            1
        } else if pages > u32::MAX as u64 {
            u32::MAX
        } else {
            pages as u32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(matches!(
            PaginationState::new(0),
            Err(DashflowError::InvalidPageSize(0))
        ));
    }

    #[test]
    fn pages_round_up_and_never_drop_below_one() {
        assert_eq!(PaginationState::pages_for(0, 10), 1);
        assert_eq!(PaginationState::pages_for(10, 10), 1);
        assert_eq!(PaginationState::pages_for(11, 10), 2);
        assert_eq!(PaginationState::pages_for(250, 25), 10);
    }
}
