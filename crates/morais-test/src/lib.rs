//! Morais Test - shared test utilities for the morais event dispatcher.
//!
//! Intended as a dev-dependency of integration test crates:
//!
//! ```toml
//! [dev-dependencies]
//! morais-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use morais_events::{EventDispatcher, ListenerOptions};
//! use morais_test::{RecordingListener, payload};
//!
//! #[test]
//! fn records_emissions() {
//!     let dispatcher = EventDispatcher::new();
//!     let recorder = RecordingListener::new();
//!     dispatcher.on("score", recorder.callback(), ListenerOptions::new()).unwrap();
//!
//!     dispatcher.emit("score", payload(42));
//!     assert_eq!(recorder.last_args(), Some(payload(42)));
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod harness;
pub mod listeners;

pub use fixtures::*;
pub use harness::*;
pub use listeners::*;
