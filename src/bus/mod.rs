//! Cross-widget event bus.
//!
//! Widgets on the same page coordinate through [`EventBus`] by publishing an
//! opaque [`SelectionKey`](crate::domain::SelectionKey) on one of a closed set
//! of [`Channel`]s ("the user clicked publisher P, show its details").
//! Subscribers are plain closures; the bus is single-threaded and `!Send`.
//!
//! ```
//! use dashflow::bus::{Channel, EventBus};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let bus = EventBus::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! let sub = bus.subscribe(Channel::ShowPublisherDetails, move |key| {
//!     sink.borrow_mut().push(key.to_string());
//! });
//!
//! bus.publish(Channel::ShowPublisherDetails, &"P-42".into());
//! drop(sub);
//! bus.publish(Channel::ShowPublisherDetails, &"P-43".into());
//!
//! assert_eq!(*seen.borrow(), vec!["P-42".to_string()]);
//! ```

#[allow(clippy::module_inception)]
pub mod bus;
pub mod channel;

pub use bus::{EventBus, Subscription};
pub use channel::Channel;
