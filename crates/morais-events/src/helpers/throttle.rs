//! Leading-edge throttled emission.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::dispatcher::EventDispatcher;
use crate::event::EventArgs;

/// Create an emitter that fires `event` at most once per `interval`.
#[must_use]
pub fn throttle_emit(
    dispatcher: &EventDispatcher,
    event: &str,
    interval: Duration,
) -> ThrottledEmitter {
    ThrottledEmitter {
        dispatcher: dispatcher.clone(),
        event: event.to_owned(),
        interval,
        last_emit: Mutex::new(None),
    }
}

/// Emitter returned by [`throttle_emit`].
///
/// The first call emits immediately. Calls arriving before `interval` has
/// elapsed since the last emission are dropped, not queued.
#[derive(Debug)]
pub struct ThrottledEmitter {
    dispatcher: EventDispatcher,
    event: String,
    interval: Duration,
    last_emit: Mutex<Option<Instant>>,
}

impl ThrottledEmitter {
    /// Emit `args` unless the window since the last emission is still open.
    ///
    /// Returns the result of `emit`, or `None` if the call was dropped.
    pub fn call(&self, args: EventArgs) -> Option<bool> {
        let now = Instant::now();
        {
            let mut last_emit = self.last_emit.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(previous) = *last_emit
                && now.duration_since(previous) < self.interval
            {
                trace!(event = %self.event, "Throttled emission dropped");
                return None;
            }
            *last_emit = Some(now);
        }

        Some(self.dispatcher.emit(&self.event, args))
    }

    /// Reopen the window so the next call emits immediately.
    pub fn reset(&self) {
        *self.last_emit.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Throttled event name.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }
}
