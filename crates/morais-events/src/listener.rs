//! Listener callbacks, options and registry records.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ListenerResult;
use crate::event::{Event, ListenerContext, OwnedEvent};

type SyncFn = dyn Fn(&Event<'_>) -> ListenerResult + Send + Sync;
type AsyncFn = dyn Fn(OwnedEvent) -> BoxFuture<'static, ListenerResult> + Send + Sync;

#[derive(Clone)]
pub(crate) enum CallbackKind {
    Sync(Arc<SyncFn>),
    Async(Arc<AsyncFn>),
}

/// A listener callback.
///
/// Cloning is cheap and clones compare equal under [`Callback::ptr_eq`],
/// which is the identity [`EventDispatcher::off`](crate::EventDispatcher::off)
/// uses to find a listener.
#[derive(Clone)]
pub struct Callback(CallbackKind);

impl Callback {
    /// Wrap a synchronous listener.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Event<'_>) -> ListenerResult + Send + Sync + 'static,
    {
        Self(CallbackKind::Sync(Arc::new(f)))
    }

    /// Wrap an asynchronous listener.
    ///
    /// `emit_async` awaits these concurrently; `emit` spawns them on the
    /// current Tokio runtime.
    pub fn new_async<F, Fut>(f: F) -> Self
    where
        F: Fn(OwnedEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ListenerResult> + Send + 'static,
    {
        Self(CallbackKind::Async(Arc::new(move |event| f(event).boxed())))
    }

    /// Whether this callback is asynchronous.
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self.0, CallbackKind::Async(_))
    }

    /// Reference equality: true when both handles wrap the same function.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (CallbackKind::Sync(a), CallbackKind::Sync(b)) => Arc::ptr_eq(a, b),
            (CallbackKind::Async(a), CallbackKind::Async(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn kind(&self) -> &CallbackKind {
        &self.0
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("is_async", &self.is_async())
            .finish_non_exhaustive()
    }
}

/// Unique identifier of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Optional settings for `on`/`once`.
#[derive(Clone, Default)]
pub struct ListenerOptions {
    /// Higher priorities run first. Defaults to 0.
    pub priority: i32,
    /// Owner value exposed to the callback via [`Event::context`].
    pub context: Option<ListenerContext>,
}

impl ListenerOptions {
    /// Default options: priority 0, no context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Bind the listener to an owner value.
    #[must_use]
    pub fn with_context<T: Any + Send + Sync>(mut self, context: T) -> Self {
        self.context = Some(Arc::new(context));
        self
    }

    /// Bind the listener to an already shared owner value.
    #[must_use]
    pub fn with_shared_context(mut self, context: ListenerContext) -> Self {
        self.context = Some(context);
        self
    }
}

impl fmt::Debug for ListenerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerOptions")
            .field("priority", &self.priority)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

/// Metadata describing a registered listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerInfo {
    /// Listener identifier.
    pub id: ListenerId,
    /// Priority the listener was registered with.
    pub priority: i32,
    /// Whether the listener was registered with `once`.
    pub once: bool,
    /// Whether the callback is asynchronous.
    pub is_async: bool,
    /// Whether a context value is bound.
    pub has_context: bool,
}

/// Payload of the `"error"` meta-event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerFailure {
    /// Event whose delivery failed.
    pub event: String,
    /// Rendered listener error.
    pub error: String,
    /// The listener that failed.
    pub listener: ListenerInfo,
}

/// A registered listener.
pub(crate) struct ListenerRecord {
    pub(crate) id: ListenerId,
    pub(crate) callback: Callback,
    pub(crate) priority: i32,
    pub(crate) context: Option<ListenerContext>,
    pub(crate) once: bool,
    fired: AtomicBool,
}

impl ListenerRecord {
    pub(crate) fn new(callback: Callback, options: ListenerOptions, once: bool) -> Self {
        Self {
            id: ListenerId::new(),
            callback,
            priority: options.priority,
            context: options.context,
            once,
            fired: AtomicBool::new(false),
        }
    }

    /// Claim the right to invoke this listener.
    ///
    /// Always succeeds for persistent listeners; succeeds exactly once for
    /// one-shot listeners, across every emission that snapshotted them.
    pub(crate) fn claim(&self) -> bool {
        !self.once || !self.fired.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn info(&self) -> ListenerInfo {
        ListenerInfo {
            id: self.id,
            priority: self.priority,
            once: self.once,
            is_async: self.callback.is_async(),
            has_context: self.context.is_some(),
        }
    }
}
