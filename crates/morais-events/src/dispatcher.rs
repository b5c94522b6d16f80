//! Event dispatcher: registry, subscriptions and delivery.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use tokio::runtime::Handle;
use tracing::{debug, error, trace, warn};

use crate::config::{DispatcherConfig, ValidationMode};
use crate::error::{EventError, EventResult, ListenerError, ListenerResult};
use crate::event::{Event, EventArgs, OwnedEvent};
use crate::listener::{
    Callback, CallbackKind, ListenerFailure, ListenerId, ListenerInfo, ListenerOptions,
    ListenerRecord,
};
use crate::namespace::Namespace;
use crate::stats::{DispatcherStats, EventStats};

/// Name of the meta-event that reports listener failures.
pub const ERROR_EVENT: &str = "error";

type Registry = BTreeMap<String, Vec<Arc<ListenerRecord>>>;

struct Shared {
    registry: RwLock<Registry>,
    max_listeners: AtomicUsize,
    debug: AtomicBool,
    strict: AtomicBool,
}

impl Shared {
    // Listener panics are caught outside the lock, so a poisoned lock still
    // guards a consistent registry.
    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_debug(&self) -> bool {
        self.debug.load(Ordering::Relaxed)
    }

    /// Remove the first listener of `event` matching `predicate`.
    ///
    /// The removed record is returned so it is dropped after the write lock
    /// is released; dropping a callback may run arbitrary code.
    fn remove_first<P>(&self, event: &str, predicate: P) -> Option<Arc<ListenerRecord>>
    where
        P: Fn(&ListenerRecord) -> bool,
    {
        let (removed, remaining) = {
            let mut registry = self.write();
            let listeners = registry.get_mut(event)?;
            let pos = listeners.iter().position(|l| predicate(&**l))?;
            let removed = listeners.remove(pos);
            let remaining = listeners.len();
            if remaining == 0 {
                registry.remove(event);
            }
            (removed, remaining)
        };

        if self.is_debug() {
            debug!(
                event,
                listener_id = %removed.id,
                listener_count = remaining,
                "Listener removed"
            );
        }

        Some(removed)
    }
}

/// In-process publish/subscribe dispatcher.
///
/// Clones share the same registry. Delivery is synchronous for
/// [`emit`](Self::emit) and concurrent for [`emit_async`](Self::emit_async).
///
/// **WARNING:** a listener that captures a clone of the dispatcher it is
/// registered on forms an `Arc` cycle and keeps the registry alive until the
/// listener is removed. Prefer removing such listeners explicitly, or
/// capture a [`Namespace`] or helper that is dropped with its owner.
#[derive(Clone)]
pub struct EventDispatcher {
    shared: Arc<Shared>,
}

impl EventDispatcher {
    /// Create a dispatcher with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&DispatcherConfig::default())
    }

    /// Create a dispatcher from explicit settings.
    #[must_use]
    pub fn with_config(config: &DispatcherConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                registry: RwLock::new(BTreeMap::new()),
                max_listeners: AtomicUsize::new(config.max_listeners),
                debug: AtomicBool::new(config.debug),
                strict: AtomicBool::new(config.validation == ValidationMode::Strict),
            }),
        }
    }

    /// Current settings.
    #[must_use]
    pub fn config(&self) -> DispatcherConfig {
        DispatcherConfig {
            max_listeners: self.max_listeners(),
            debug: self.is_debug(),
            validation: self.validation_mode(),
        }
    }

    /// Set the advisory per-event listener cap (0 disables the warning).
    pub fn set_max_listeners(&self, max_listeners: usize) {
        self.shared
            .max_listeners
            .store(max_listeners, Ordering::Relaxed);
    }

    /// Advisory per-event listener cap.
    #[must_use]
    pub fn max_listeners(&self) -> usize {
        self.shared.max_listeners.load(Ordering::Relaxed)
    }

    /// Toggle debug logging of subscribe, unsubscribe and emit.
    pub fn set_debug(&self, enabled: bool) {
        self.shared.debug.store(enabled, Ordering::Relaxed);
    }

    /// Whether debug logging is enabled.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.shared.is_debug()
    }

    /// Choose how invalid registrations are handled.
    pub fn set_validation_mode(&self, mode: ValidationMode) {
        self.shared
            .strict
            .store(mode == ValidationMode::Strict, Ordering::Relaxed);
    }

    /// Current validation mode.
    #[must_use]
    pub fn validation_mode(&self) -> ValidationMode {
        if self.shared.strict.load(Ordering::Relaxed) {
            ValidationMode::Strict
        } else {
            ValidationMode::Permissive
        }
    }

    /// Register a listener for `event`.
    ///
    /// Listeners run in descending priority; equal priorities keep
    /// registration order. Registering the same callback twice creates two
    /// independent listeners.
    ///
    /// # Errors
    ///
    /// In [`ValidationMode::Strict`], returns [`EventError::InvalidListener`]
    /// for an empty event name. In permissive mode the problem is logged and
    /// an inert subscription is returned instead.
    pub fn on(
        &self,
        event: &str,
        callback: Callback,
        options: ListenerOptions,
    ) -> EventResult<Subscription> {
        self.subscribe(event, callback, options, false)
    }

    /// Register a listener that runs at most once.
    ///
    /// The listener is removed before its callback runs, so reentrant
    /// emissions from inside the callback do not invoke it again.
    ///
    /// # Errors
    ///
    /// Same as [`on`](Self::on).
    pub fn once(
        &self,
        event: &str,
        callback: Callback,
        options: ListenerOptions,
    ) -> EventResult<Subscription> {
        self.subscribe(event, callback, options, true)
    }

    fn subscribe(
        &self,
        event: &str,
        callback: Callback,
        options: ListenerOptions,
        once: bool,
    ) -> EventResult<Subscription> {
        if let Err(reason) = validate_event_name(event) {
            if self.validation_mode() == ValidationMode::Strict {
                return Err(EventError::InvalidListener {
                    event: event.to_owned(),
                    reason,
                });
            }
            error!(event, %reason, "Ignoring invalid listener registration");
            return Ok(Subscription::inert(event));
        }

        let record = Arc::new(ListenerRecord::new(callback, options, once));
        let id = record.id;
        let max = self.max_listeners();

        let (previous, count) = {
            let mut registry = self.shared.write();
            let listeners = registry.entry(event.to_owned()).or_default();
            let previous = listeners.len();
            let pos = listeners
                .iter()
                .position(|l| l.priority < record.priority)
                .unwrap_or(previous);
            listeners.insert(pos, record);
            (previous, listeners.len())
        };

        if max > 0 && previous >= max {
            warn!(
                event,
                listener_count = count,
                max_listeners = max,
                "Listener count exceeds the configured maximum, possible leak"
            );
        }

        if self.is_debug() {
            debug!(event, listener_id = %id, listener_count = count, once, "Listener added");
        }

        Ok(Subscription {
            event: event.to_owned(),
            id: Some(id),
            dispatcher: Arc::downgrade(&self.shared),
        })
    }

    /// Remove the first listener of `event` registered with `callback`.
    ///
    /// Matching is by reference ([`Callback::ptr_eq`]). Returns `true` if a
    /// listener was removed.
    pub fn off(&self, event: &str, callback: &Callback) -> bool {
        self.shared
            .remove_first(event, |l| l.callback.ptr_eq(callback))
            .is_some()
    }

    /// Remove every listener of `event`, or of every event when `None`.
    ///
    /// Returns the number of listeners removed.
    pub fn remove_all_listeners(&self, event: Option<&str>) -> usize {
        match event {
            Some(name) => self.remove_events(|candidate| candidate == name),
            None => {
                let removed = std::mem::take(&mut *self.shared.write());
                let count = count_listeners(removed.values());
                if self.is_debug() {
                    debug!(listener_count = count, "All listeners removed");
                }
                count
            },
        }
    }

    /// Remove every event whose name satisfies `matches`.
    pub(crate) fn remove_events<P>(&self, matches: P) -> usize
    where
        P: Fn(&str) -> bool,
    {
        let removed: Vec<(String, Vec<Arc<ListenerRecord>>)> = {
            let mut registry = self.shared.write();
            let names: Vec<String> = registry
                .keys()
                .filter(|name| matches(name))
                .cloned()
                .collect();
            names
                .into_iter()
                .filter_map(|name| registry.remove_entry(&name))
                .collect()
        };

        let count = count_listeners(removed.iter().map(|(_, listeners)| listeners));
        if self.is_debug() {
            for (name, listeners) in &removed {
                debug!(event = %name, listener_count = listeners.len(), "Event listeners removed");
            }
        }
        count
    }

    /// Deliver `args` to every listener of `event`, in order.
    ///
    /// Delivery iterates over a snapshot taken before the first listener
    /// runs. A failing listener is logged, reported through the
    /// [`ERROR_EVENT`] meta-event, and does not stop delivery to the rest.
    ///
    /// Returns `false` if there were no listeners or any listener failed.
    pub fn emit(&self, event: &str, args: EventArgs) -> bool {
        let listeners = self.snapshot(event);
        self.log_emission(event, listeners.len());
        if listeners.is_empty() {
            return false;
        }

        let name: Arc<str> = Arc::from(event);
        let args = Arc::new(args);
        let mut delivered = true;

        for record in &listeners {
            if !self.begin_delivery(event, record) {
                continue;
            }
            if let Err(err) = self.invoke(&name, &args, record) {
                delivered = false;
                self.report_failure(event, record.info(), &err);
            }
        }

        delivered
    }

    /// Deliver `args` to every listener of `event` and await them together.
    ///
    /// Every listener is started before any is awaited. Rejections are
    /// reported like [`emit`](Self::emit) failures once all listeners have
    /// settled.
    ///
    /// Returns `false` if there were no listeners or any listener failed.
    pub async fn emit_async(&self, event: &str, args: EventArgs) -> bool {
        let listeners = self.snapshot(event);
        self.log_emission(event, listeners.len());
        if listeners.is_empty() {
            return false;
        }

        let name: Arc<str> = Arc::from(event);
        let args = Arc::new(args);
        let mut pending = Vec::with_capacity(listeners.len());

        for record in &listeners {
            if self.begin_delivery(event, record) {
                pending.push(self.start(&name, &args, record));
            }
        }

        let mut delivered = true;
        for (listener, outcome) in future::join_all(pending).await {
            if let Err(err) = outcome {
                delivered = false;
                self.report_failure(event, listener, &err);
            }
        }

        delivered
    }

    /// Number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.shared.read().get(event).map_or(0, Vec::len)
    }

    /// Whether `event` has any listener.
    #[must_use]
    pub fn has_listeners(&self, event: &str) -> bool {
        self.listener_count(event) > 0
    }

    /// Names of all events with at least one listener, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        self.shared.read().keys().cloned().collect()
    }

    /// Metadata of the listeners of `event`, in delivery order.
    #[must_use]
    pub fn listeners(&self, event: &str) -> Vec<ListenerInfo> {
        self.shared
            .read()
            .get(event)
            .map(|listeners| listeners.iter().map(|l| l.info()).collect())
            .unwrap_or_default()
    }

    /// A view that prefixes every event name with `"{prefix}:"`.
    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Namespace {
        Namespace::new(self.clone(), prefix)
    }

    /// Registry summary for diagnostics.
    #[must_use]
    pub fn stats(&self) -> DispatcherStats {
        let events: Vec<EventStats> = self
            .shared
            .read()
            .iter()
            .map(|(name, listeners)| EventStats {
                name: name.clone(),
                listeners: listeners.len(),
            })
            .collect();

        DispatcherStats {
            total_events: events.len(),
            total_listeners: events
                .iter()
                .fold(0_usize, |acc, e| acc.saturating_add(e.listeners)),
            max_listeners: self.max_listeners(),
            events,
        }
    }

    fn snapshot(&self, event: &str) -> Vec<Arc<ListenerRecord>> {
        self.shared.read().get(event).cloned().unwrap_or_default()
    }

    fn log_emission(&self, event: &str, listener_count: usize) {
        if self.is_debug() {
            debug!(event, listener_count, "Emitting event");
        } else {
            trace!(event, listener_count, "Emitting event");
        }
    }

    /// Claim `record` for this emission, unregistering one-shot listeners.
    fn begin_delivery(&self, event: &str, record: &ListenerRecord) -> bool {
        if !record.claim() {
            return false;
        }
        if record.once {
            self.shared.remove_first(event, |l| l.id == record.id);
        }
        true
    }

    /// Run one listener from `emit`. Async listeners are spawned.
    fn invoke(
        &self,
        name: &Arc<str>,
        args: &Arc<EventArgs>,
        record: &ListenerRecord,
    ) -> ListenerResult {
        match record.callback.kind() {
            CallbackKind::Sync(f) => {
                let event = Event::new(name, args, record.context.as_ref());
                catch_unwind(AssertUnwindSafe(|| f(&event)))
                    .unwrap_or_else(|payload| Err(ListenerError::from_panic(&*payload)))
            },
            CallbackKind::Async(f) => {
                let Ok(runtime) = Handle::try_current() else {
                    return Err(ListenerError::NoRuntime);
                };
                let event = OwnedEvent::new(
                    Arc::clone(name),
                    Arc::clone(args),
                    record.context.clone(),
                );
                let pending = catch_unwind(AssertUnwindSafe(|| f(event)))
                    .map_err(|payload| ListenerError::from_panic(&*payload))?;

                let dispatcher = self.clone();
                let listener = record.info();
                let name = Arc::clone(name);
                runtime.spawn(async move {
                    if let Err(err) = settle(pending).await {
                        dispatcher.report_failure(&name, listener, &err);
                    }
                });
                Ok(())
            },
        }
    }

    /// Start one listener from `emit_async`.
    fn start(
        &self,
        name: &Arc<str>,
        args: &Arc<EventArgs>,
        record: &ListenerRecord,
    ) -> BoxFuture<'static, (ListenerInfo, ListenerResult)> {
        let listener = record.info();
        match record.callback.kind() {
            CallbackKind::Sync(_) => {
                let outcome = self.invoke(name, args, record);
                future::ready((listener, outcome)).boxed()
            },
            CallbackKind::Async(f) => {
                let event = OwnedEvent::new(
                    Arc::clone(name),
                    Arc::clone(args),
                    record.context.clone(),
                );
                match catch_unwind(AssertUnwindSafe(|| f(event))) {
                    Ok(pending) => settle(pending)
                        .map(move |outcome| (listener, outcome))
                        .boxed(),
                    Err(payload) => {
                        let outcome = Err(ListenerError::from_panic(&*payload));
                        future::ready((listener, outcome)).boxed()
                    },
                }
            },
        }
    }

    fn report_failure(&self, event: &str, listener: ListenerInfo, err: &ListenerError) {
        error!(
            event,
            listener_id = %listener.id,
            priority = listener.priority,
            error = %err,
            "Listener failed"
        );

        // Failures of error handlers are only logged.
        if event == ERROR_EVENT {
            return;
        }

        let failure = ListenerFailure {
            event: event.to_owned(),
            error: err.to_string(),
            listener,
        };
        match serde_json::to_value(&failure) {
            Ok(payload) => {
                self.emit(ERROR_EVENT, vec![payload]);
            },
            Err(e) => warn!(event, error = %e, "Failed to encode listener failure"),
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.shared.read();
        f.debug_struct("EventDispatcher")
            .field("event_count", &registry.len())
            .field("listener_count", &count_listeners(registry.values()))
            .field("max_listeners", &self.max_listeners())
            .field("debug", &self.is_debug())
            .finish()
    }
}

/// Handle returned by `on`/`once`.
///
/// Dropping the handle does not unsubscribe; use
/// [`guard`](Self::guard) for scope-bound listeners.
#[derive(Debug, Clone)]
pub struct Subscription {
    event: String,
    id: Option<ListenerId>,
    dispatcher: Weak<Shared>,
}

impl Subscription {
    fn inert(event: &str) -> Self {
        Self {
            event: event.to_owned(),
            id: None,
            dispatcher: Weak::new(),
        }
    }

    /// Event the listener was registered for.
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Listener identifier, `None` for a rejected registration.
    #[must_use]
    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }

    /// Whether the listener is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let (Some(id), Some(shared)) = (self.id, self.dispatcher.upgrade()) else {
            return false;
        };
        shared
            .read()
            .get(&self.event)
            .is_some_and(|listeners| listeners.iter().any(|l| l.id == id))
    }

    /// Remove exactly this listener.
    ///
    /// Returns `true` the first time it removes the listener and `false`
    /// on every later call.
    pub fn unsubscribe(&self) -> bool {
        let (Some(id), Some(shared)) = (self.id, self.dispatcher.upgrade()) else {
            return false;
        };
        shared.remove_first(&self.event, |l| l.id == id).is_some()
    }

    /// Convert into a guard that unsubscribes when dropped.
    #[must_use]
    pub fn guard(self) -> SubscriptionGuard {
        SubscriptionGuard(Some(self))
    }
}

/// Unsubscribes its listener when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct SubscriptionGuard(Option<Subscription>);

impl SubscriptionGuard {
    /// The guarded subscription.
    #[must_use]
    pub fn subscription(&self) -> Option<&Subscription> {
        self.0.as_ref()
    }

    /// Release the listener from the guard without unsubscribing.
    #[must_use]
    pub fn disarm(mut self) -> Option<Subscription> {
        self.0.take()
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(subscription) = self.0.take() {
            subscription.unsubscribe();
        }
    }
}

fn validate_event_name(event: &str) -> Result<(), String> {
    if event.trim().is_empty() {
        return Err("event name must not be empty".to_owned());
    }
    Ok(())
}

fn count_listeners<'a, I>(lists: I) -> usize
where
    I: IntoIterator<Item = &'a Vec<Arc<ListenerRecord>>>,
{
    lists
        .into_iter()
        .fold(0_usize, |acc, l| acc.saturating_add(l.len()))
}

async fn settle(pending: BoxFuture<'static, ListenerResult>) -> ListenerResult {
    AssertUnwindSafe(pending)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(ListenerError::from_panic(&*payload)))
}
