//! Await a single emission.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::debug;

use crate::dispatcher::{EventDispatcher, Subscription, SubscriptionGuard};
use crate::error::{EventError, EventResult};
use crate::event::EventArgs;
use crate::listener::{Callback, ListenerOptions};

/// Wait for the next emission of `event`.
///
/// The listener is registered and the timeout starts when this function is
/// called, so an emission that happens before the returned future is first
/// polled is still observed.
///
/// Resolves with the emitted argument when exactly one was passed, and with
/// a JSON array of all arguments otherwise. The temporary listener is
/// removed whether the wait resolves, times out, or is dropped.
///
/// # Errors
///
/// - [`EventError::Timeout`] if `timeout` elapses first.
/// - [`EventError::Cancelled`] if the listener is removed by someone else
///   (for example `remove_all_listeners`) before the event fires.
/// - [`EventError::InvalidListener`] for an invalid name in strict mode.
pub fn wait_for_event(
    dispatcher: &EventDispatcher,
    event: &str,
    timeout: Option<Duration>,
) -> impl Future<Output = EventResult<Value>> + Send + 'static {
    let (tx, rx) = oneshot::channel::<EventArgs>();
    let tx = Mutex::new(Some(tx));

    let callback = Callback::new(move |emission| {
        let sender = tx.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(sender) = sender {
            // The receiver is gone only if the wait was already abandoned.
            let _ = sender.send(emission.args().to_vec());
        }
        Ok(())
    });

    let guard = dispatcher
        .once(event, callback, ListenerOptions::new())
        .map(Subscription::guard);
    let deadline = timeout.and_then(|limit| Some((Instant::now().checked_add(limit)?, limit)));
    wait(guard, rx, deadline, event.to_owned())
}

async fn wait(
    guard: EventResult<SubscriptionGuard>,
    rx: oneshot::Receiver<EventArgs>,
    deadline: Option<(Instant, Duration)>,
    event: String,
) -> EventResult<Value> {
    let _guard = guard?;

    let received = match deadline {
        Some((at, limit)) => {
            if let Ok(received) = tokio::time::timeout_at(at, rx).await {
                received
            } else {
                let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                debug!(event, timeout_ms, "Wait for event timed out");
                return Err(EventError::Timeout { event, timeout_ms });
            }
        },
        None => rx.await,
    };

    let args = received.map_err(|_| EventError::Cancelled { event })?;
    Ok(collapse_args(args))
}

fn collapse_args(args: EventArgs) -> Value {
    match <[Value; 1]>::try_from(args) {
        Ok([single]) => single,
        Err(args) => Value::Array(args),
    }
}
