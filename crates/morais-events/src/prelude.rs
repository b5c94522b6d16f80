//! Prelude module - commonly used types for convenient import.
//!
//! Use `use morais_events::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use morais_events::prelude::*;
//!
//! let dispatcher = EventDispatcher::new();
//! let quiz = dispatcher.namespace("quiz");
//!
//! quiz.on("answered", Callback::new(|_| Ok(())), ListenerOptions::new())
//!     .unwrap();
//!
//! assert!(quiz.emit("answered", vec![]));
//! ```

// Dispatcher
pub use crate::{
    DispatcherConfig, ERROR_EVENT, EventDispatcher, Namespace, Subscription, SubscriptionGuard,
    ValidationMode,
};

// Listeners
pub use crate::{
    Callback, Event, EventArgs, ListenerFailure, ListenerInfo, ListenerOptions, OwnedEvent,
};

// Errors
pub use crate::{EventError, EventResult, ListenerError, ListenerResult};

// Helpers
pub use crate::{
    DebouncedEmitter, ThrottledEmitter, debounce_emit, throttle_emit, wait_for_event,
};
