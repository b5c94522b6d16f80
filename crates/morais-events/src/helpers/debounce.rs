//! Trailing-edge debounced emission.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::dispatcher::EventDispatcher;
use crate::error::{EventError, EventResult};
use crate::event::EventArgs;

/// Create an emitter that fires `event` once calls stop for `delay`.
///
/// # Errors
///
/// Returns [`EventError::NoRuntime`] when called outside a Tokio runtime;
/// the quiet-period timer runs on the runtime captured here.
pub fn debounce_emit(
    dispatcher: &EventDispatcher,
    event: &str,
    delay: Duration,
) -> EventResult<DebouncedEmitter> {
    let runtime = Handle::try_current().map_err(|_| EventError::NoRuntime)?;
    Ok(DebouncedEmitter {
        state: Arc::new(DebounceState {
            dispatcher: dispatcher.clone(),
            event: event.to_owned(),
            delay,
            runtime,
            pending: Mutex::new(Pending::default()),
        }),
    })
}

/// Emitter returned by [`debounce_emit`].
///
/// Each [`call`](Self::call) replaces the pending arguments and restarts
/// the timer, so only the last call before a quiet period is emitted.
#[derive(Debug, Clone)]
pub struct DebouncedEmitter {
    state: Arc<DebounceState>,
}

#[derive(Debug)]
struct DebounceState {
    dispatcher: EventDispatcher,
    event: String,
    delay: Duration,
    runtime: Handle,
    pending: Mutex<Pending>,
}

#[derive(Debug, Default)]
struct Pending {
    args: Option<EventArgs>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

impl DebounceState {
    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Emit if no call arrived since `generation` was scheduled.
    fn fire(&self, generation: u64) {
        let args = {
            let mut pending = self.lock();
            if pending.generation != generation {
                return;
            }
            pending.timer = None;
            pending.args.take()
        };

        if let Some(args) = args {
            self.dispatcher.emit(&self.event, args);
        }
    }
}

impl DebouncedEmitter {
    /// Record `args` and restart the quiet-period timer.
    pub fn call(&self, args: EventArgs) {
        let mut pending = self.state.lock();
        pending.args = Some(args);
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.generation = pending.generation.wrapping_add(1);

        let generation = pending.generation;
        let state = Arc::clone(&self.state);
        pending.timer = Some(self.state.runtime.spawn(async move {
            tokio::time::sleep(state.delay).await;
            state.fire(generation);
        }));

        trace!(event = %self.state.event, "Debounced emission rescheduled");
    }

    /// Emit pending arguments now instead of waiting for the timer.
    ///
    /// Returns the result of `emit`, or `None` if nothing was pending.
    pub fn flush(&self) -> Option<bool> {
        let args = self.take_pending()?;
        Some(self.state.dispatcher.emit(&self.state.event, args))
    }

    /// Drop pending arguments without emitting.
    ///
    /// Returns `true` if an emission was pending.
    pub fn cancel(&self) -> bool {
        self.take_pending().is_some()
    }

    /// Whether an emission is scheduled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state.lock().args.is_some()
    }

    /// Debounced event name.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.state.event
    }

    fn take_pending(&self) -> Option<EventArgs> {
        let mut pending = self.state.lock();
        if let Some(timer) = pending.timer.take() {
            timer.abort();
        }
        pending.generation = pending.generation.wrapping_add(1);
        pending.args.take()
    }
}
