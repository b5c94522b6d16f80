//! Recording and misbehaving listeners.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use morais_events::{Callback, ListenerError};
use serde_json::Value;

/// One invocation captured by a [`RecordingListener`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Label of the listener that was invoked.
    pub label: String,
    /// Full event name.
    pub event: String,
    /// Arguments the listener received.
    pub args: Vec<Value>,
}

/// Captures every invocation into a log shared by all its labelled siblings.
///
/// Siblings created with [`labeled`](Self::labeled) append to the same log,
/// so delivery order across listeners can be asserted.
#[derive(Debug, Clone)]
pub struct RecordingListener {
    label: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl Default for RecordingListener {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingListener {
    /// Create a listener labelled `"listener"` with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            label: "listener".to_owned(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A sibling with its own label that records into the same log.
    #[must_use]
    pub fn labeled(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            calls: Arc::clone(&self.calls),
        }
    }

    /// Label of this listener.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// A synchronous callback that records into the log.
    ///
    /// Every call creates a distinct callback; keep it to pass to `off`.
    #[must_use]
    pub fn callback(&self) -> Callback {
        let recorder = self.clone();
        Callback::new(move |event| {
            recorder.record(event.name(), event.args());
            Ok(())
        })
    }

    /// An asynchronous callback that yields once, then records.
    #[must_use]
    pub fn async_callback(&self) -> Callback {
        let recorder = self.clone();
        Callback::new_async(move |event| {
            let recorder = recorder.clone();
            async move {
                tokio::task::yield_now().await;
                recorder.record(event.name(), event.args());
                Ok::<(), ListenerError>(())
            }
        })
    }

    /// Every recorded call, in invocation order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().clone()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Labels of the recorded calls, in invocation order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.lock().iter().map(|c| c.label.clone()).collect()
    }

    /// Arguments of the most recent call.
    #[must_use]
    pub fn last_args(&self) -> Option<Vec<Value>> {
        self.lock().last().map(|c| c.args.clone())
    }

    /// Forget every recorded call.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Poll until at least `expected` calls are recorded or `timeout` passes.
    ///
    /// Returns whether the count was reached.
    pub async fn wait_for_calls(&self, expected: usize, timeout: Duration) -> bool {
        let poll = async {
            while self.count() < expected {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        };
        tokio::time::timeout(timeout, poll).await.is_ok()
    }

    fn record(&self, event: &str, args: &[Value]) {
        self.lock().push(RecordedCall {
            label: self.label.clone(),
            event: event.to_owned(),
            args: args.to_vec(),
        });
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A callback that does nothing.
#[must_use]
pub fn noop_callback() -> Callback {
    Callback::new(|_| Ok(()))
}

/// A callback that always returns [`ListenerError::Failed`] with `message`.
#[must_use]
pub fn failing_callback(message: &str) -> Callback {
    let message = message.to_owned();
    Callback::new(move |_| Err(ListenerError::msg(message.clone())))
}

/// An async callback that always rejects with `message`.
#[must_use]
pub fn failing_async_callback(message: &str) -> Callback {
    let message = message.to_owned();
    Callback::new_async(move |_| {
        let err = ListenerError::msg(message.clone());
        async move { Err::<(), ListenerError>(err) }
    })
}

/// A callback that panics with `message`.
#[must_use]
pub fn panicking_callback(message: &str) -> Callback {
    let message = message.to_owned();
    Callback::new(move |_| panic!("{message}"))
}
