//! Utilities built on the dispatcher's public operations.

mod debounce;
mod throttle;
mod wait;

pub use debounce::{DebouncedEmitter, debounce_emit};
pub use throttle::{ThrottledEmitter, throttle_emit};
pub use wait::wait_for_event;
