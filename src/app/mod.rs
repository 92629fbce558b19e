//! Screen orchestration layer.
//!
//! One [`ScreenState`] per mounted screen, built from the screen's
//! [`ScreenDescriptor`]. Inputs arrive as [`Event`]s, and
//! [`handle_event`] returns the side effects as [`Action`]s for the runtime to
//! execute:
//!
//! ```text
//! User input / timers / responses → Event → handle_event → Vec<Action>
//!                                               │
//!                                          ScreenView (read-only)
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effects emitted by the handler
//! - [`handler`]: Event processing
//! - [`screen`]: Per-screen descriptors
//! - [`state`]: Per-screen state container
//! - [`view`]: Read-only snapshot for rendering
//!
//! # Example
//!
//! ```rust
//! use dashflow::app::{handle_event, Action, Event, ScreenKind, ScreenState};
//! use dashflow::Config;
//! use std::time::Instant;
//!
//! let mut state = ScreenState::new(ScreenKind::RuleConfig, &Config::default())?;
//! let (_, actions) = handle_event(&mut state, &Event::set_filter("tenant", "T1"), Instant::now())?;
//! assert!(matches!(actions.as_slice(), [Action::Issue(_)]));
//! # Ok::<(), dashflow::DashflowError>(())
//! ```

pub mod actions;
pub mod handler;
pub mod screen;
pub mod state;
pub mod view;

pub use actions::Action;
pub use handler::{handle_event, Event};
pub use screen::{ScreenDescriptor, ScreenKind};
pub use state::ScreenState;
pub use view::ScreenView;
