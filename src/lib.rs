//! dashflow: derived-query and async-export orchestration for dashboard screens.
//!
//! Every screen of a multi-tenant analytics dashboard (publisher summaries,
//! fraud drill-downs, rule and geo configuration tables, mailing lists,
//! reports, the delivery-options export modal) does the same thing: it builds
//! an immutable request payload from a changing set of filter inputs, holds
//! back network calls until the inputs are complete, and for exports waits for
//! the backend to hand back a download locator that must be used exactly once.
//! This crate is that machinery, shared by all screens.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Runtime (network::ScreenDriver, tokio current-thread)│
//! └──────────────────────────────────────────────────────┘
//!                        │ Event / Action
//! ┌──────────────────────────────────────────────────────┐
//! │  Screen layer (app/)                                  │
//! │  - ScreenDescriptor per screen                        │
//! │  - handle_event → Vec<Action>                         │
//! │  - ScreenView                                         │
//! └──────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌────────────────┐   ┌───────────────┐
//! │ Query core    │   │ Network        │   │ Event bus     │
//! │ (query/)      │   │ (network/)     │   │ (bus/)        │
//! │ - readiness   │   │ - envelopes    │   │ - channels    │
//! │ - deriver     │   │ - collaborator │   │ - pub/sub     │
//! │ - debounce    │   │ - driver       │   │               │
//! │ - gates       │   │                │   │               │
//! │ - pagination  │   │                │   │               │
//! │ - exports     │   │                │   │               │
//! └───────────────┘   └────────────────┘   └───────────────┘
//!                        │
//! ┌──────────────────────────────────────────────────────┐
//! │  Domain values (domain/) · paths (infrastructure/)    │
//! │  Observability (observability/): OTLP trace file      │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Readiness → derivation → fetch gate → collaborator → result. The export
//! launcher reuses the deriver's inputs with an export marker. The pagination
//! coordinator resets the page before derivation runs. The bus is orthogonal.
//!
//! # Configuration
//!
//! ```toml
//! debounce_quiet_ms = 1000
//! default_page_size = 10
//! export_poll_interval_ms = 3000
//! trace_level = "debug"
//! data_dir = "~/.local/share/dashflow"
//! ```
//!
//! # Example
//!
//! ```rust
//! use dashflow::{handle_event, initialize, Action, Config, Event, ScreenKind};
//! use std::time::Instant;
//!
//! let mut state = initialize(&Config::default(), ScreenKind::Reports)?;
//! let now = Instant::now();
//!
//! for (name, value) in [("tenant", "T1"), ("start", "2024-01-01"), ("end", "2024-01-31")] {
//!     let (_, actions) = handle_event(&mut state, &Event::set_filter(name, value), now)?;
//!     for action in actions {
//!         if let Action::Issue(request) = action {
//!             assert_eq!(request.payload.page, 1);
//!         }
//!     }
//! }
//! assert!(state.is_ready());
//! # Ok::<(), dashflow::DashflowError>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod bus;
pub mod domain;
pub mod infrastructure;
pub mod network;
pub mod observability;
pub mod query;

pub use app::{handle_event, Action, Event, ScreenKind, ScreenState, ScreenView};
pub use bus::{Channel, EventBus, Subscription};
pub use domain::{DashflowError, Result};
pub use network::{NetworkCollaborator, ScreenDriver};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Quiet window before typed search text settles. Default: 1000
    pub debounce_quiet_ms: u64,

    /// Initial rows per page. Must be non-zero. Default: 10
    pub default_page_size: u32,

    /// Delay before re-polling an export whose result had no locator. Default: 3000
    pub export_poll_interval_ms: u64,

    /// Filter directive for tracing (`trace`, `debug`, `info`, ...). Default: `"info"`
    pub trace_level: Option<String>,

    /// Directory for the trace file. See [`infrastructure::paths`] for the fallback chain.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_quiet_ms: 1000,
            default_page_size: 10,
            export_poll_interval_ms: 3000,
            trace_level: None,
            data_dir: None,
        }
    }
}

impl Config {
    /// Builds a configuration from a string map, as host applications pass it.
    ///
    /// Lenient: unknown keys are ignored and unparsable or zero values fall
    /// back to their defaults.
    ///
    /// ```rust
    /// use dashflow::Config;
    /// use std::collections::BTreeMap;
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("default_page_size".to_string(), "25".to_string());
    /// map.insert("debounce_quiet_ms".to_string(), "soon".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.default_page_size, 25);
    /// assert_eq!(config.debounce_quiet_ms, 1000);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        let text = |key: &str| map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        Self {
            debounce_quiet_ms: text("debounce_quiet_ms")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.debounce_quiet_ms),
            default_page_size: text("default_page_size")
                .and_then(|v| v.parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(defaults.default_page_size),
            export_poll_interval_ms: text("export_poll_interval_ms")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.export_poll_interval_ms),
            trace_level: text("trace_level").map(String::from),
            data_dir: text("data_dir").map(PathBuf::from),
        }
    }

    /// Parses a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DashflowError::Config`] on malformed TOML, unknown keys, or a
    /// zero page size.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        if config.default_page_size == 0 {
            return Err(DashflowError::Config("default_page_size must be greater than zero".to_string()));
        }
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`DashflowError::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Search debounce window as a [`Duration`].
    #[must_use]
    pub const fn debounce_quiet(&self) -> Duration {
        Duration::from_millis(self.debounce_quiet_ms)
    }

    /// Delay between polls of an export that has no artifact yet.
    #[must_use]
    pub const fn export_poll_interval(&self) -> Duration {
        Duration::from_millis(self.export_poll_interval_ms)
    }
}

/// Builds the state for one screen.
///
/// Tracing is not installed here; call
/// [`observability::init_tracing`] once per process for that.
///
/// # Errors
///
/// Returns [`DashflowError::InvalidPageSize`] if `config.default_page_size` is zero.
pub fn initialize(config: &Config, kind: ScreenKind) -> Result<ScreenState> {
    tracing::debug!(screen = %kind, "initializing screen");
    ScreenState::new(kind, config)
}
