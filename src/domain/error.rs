//! Error types for the orchestration core.
//!
//! This module defines the centralized error type [`DashflowError`] and a type alias
//! [`Result`] used throughout the crate. Conditions that the core treats as normal
//! flow (inputs not ready, duplicate export requests, incomplete export results) are
//! deliberately *not* represented here; they are ordinary return values.

use thiserror::Error;

/// The main error type for dashflow operations.
///
/// # Examples
///
/// ```
/// use dashflow::DashflowError;
///
/// fn validate_page_size(size: u32) -> Result<u32, DashflowError> {
///     if size == 0 {
///         return Err(DashflowError::InvalidPageSize(size));
///     }
///     Ok(size)
/// }
///
/// assert!(validate_page_size(0).is_err());
/// ```
#[derive(Debug, Error)]
pub enum DashflowError {
    /// Configuration is invalid or could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    ///
    /// Raised while reading configuration files or preparing the trace directory.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A page size of zero was requested.
    #[error("Invalid page size: {0} (must be greater than zero)")]
    InvalidPageSize(u32),

    /// A channel name did not match any known event bus channel.
    #[error("Unknown event bus channel: {0}")]
    UnknownChannel(String),

    /// A screen name did not match any known screen descriptor.
    #[error("Unknown screen: {0}")]
    UnknownScreen(String),

    /// The network collaborator could not be reached or reported an error.
    ///
    /// Produced when a failed fetch is read as a `Result` through
    /// [`GateSnapshot::result`](crate::query::GateSnapshot::result) or
    /// [`ScreenView::result`](crate::app::ScreenView::result). The core never retries.
    #[error("Network error: {0}")]
    Network(String),
}

impl From<toml::de::Error> for DashflowError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// A specialized `Result` type for dashflow operations.
pub type Result<T> = std::result::Result<T, DashflowError>;
