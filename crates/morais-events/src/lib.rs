//! Morais Events - In-process event dispatcher.
//!
//! This crate provides:
//! - A publish/subscribe registry keyed by event name
//! - Priority ordering, one-shot listeners and advisory listener caps
//! - Synchronous (`emit`) and concurrent asynchronous (`emit_async`) delivery
//! - Namespace views that prefix event names
//! - Helpers built on the public API: `wait_for_event`, debounced and
//!   throttled emitters
//!
//! # Architecture
//!
//! Listeners are stored per event name, sorted by descending priority with
//! ties kept in registration order. Every emission iterates over a snapshot
//! of the listener list, so listeners may subscribe or unsubscribe while an
//! emission is in progress without affecting it.
//!
//! A failing listener (returned error or panic) never escapes `emit`. The
//! failure is logged and re-published as the `"error"` meta-event so other
//! code can react to it.
//!
//! # Example
//!
//! ```rust
//! use morais_events::{Callback, EventDispatcher, ListenerOptions};
//! use serde_json::json;
//!
//! let dispatcher = EventDispatcher::new();
//!
//! let subscription = dispatcher
//!     .on(
//!         "score",
//!         Callback::new(|event| {
//!             assert_eq!(event.arg(0), Some(&json!(42)));
//!             Ok(())
//!         }),
//!         ListenerOptions::new().with_priority(5),
//!     )
//!     .unwrap();
//!
//! assert!(dispatcher.emit("score", vec![json!(42)]));
//! assert!(subscription.unsubscribe());
//! assert!(!dispatcher.has_listeners("score"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod helpers;
pub mod prelude;
pub mod shared;

mod config;
mod dispatcher;
mod error;
mod event;
mod listener;
mod namespace;
mod stats;

pub use config::{DEFAULT_MAX_LISTENERS, DispatcherConfig, ValidationMode};
pub use dispatcher::{ERROR_EVENT, EventDispatcher, Subscription, SubscriptionGuard};
pub use error::{EventError, EventResult, ListenerError, ListenerResult};
pub use event::{Event, EventArgs, ListenerContext, OwnedEvent};
pub use helpers::{
    DebouncedEmitter, ThrottledEmitter, debounce_emit, throttle_emit, wait_for_event,
};
pub use listener::{Callback, ListenerFailure, ListenerId, ListenerInfo, ListenerOptions};
pub use namespace::{NAMESPACE_SEPARATOR, Namespace};
pub use stats::{DispatcherStats, EventStats};
