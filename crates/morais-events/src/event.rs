//! Views of an emission handed to listeners.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ListenerError;

/// Positional arguments carried by an emission.
pub type EventArgs = Vec<Value>;

/// Owner value a listener is bound to, readable through [`Event::context`].
pub type ListenerContext = Arc<dyn Any + Send + Sync>;

/// Borrowed view of an emission, passed to synchronous listeners.
#[derive(Clone, Copy)]
pub struct Event<'a> {
    name: &'a str,
    args: &'a [Value],
    context: Option<&'a ListenerContext>,
}

impl<'a> Event<'a> {
    pub(crate) fn new(
        name: &'a str,
        args: &'a [Value],
        context: Option<&'a ListenerContext>,
    ) -> Self {
        Self {
            name,
            args,
            context,
        }
    }

    /// Full event name, including any namespace prefix.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// All positional arguments.
    #[must_use]
    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// Argument at `index`, if present.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.args.get(index)
    }

    /// Deserialize the argument at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Payload`] if the argument is missing or does
    /// not match `T`.
    pub fn arg_as<T: DeserializeOwned>(&self, index: usize) -> Result<T, ListenerError> {
        decode_arg(self.args, index)
    }

    /// The context the listener was registered with, if it has type `T`.
    #[must_use]
    pub fn context<T: Any>(&self) -> Option<&'a T> {
        let context: &'a (dyn Any + Send + Sync) = &**self.context?;
        context.downcast_ref::<T>()
    }
}

impl fmt::Debug for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

/// Owned view of an emission, passed to asynchronous listeners.
#[derive(Clone)]
pub struct OwnedEvent {
    name: Arc<str>,
    args: Arc<EventArgs>,
    context: Option<ListenerContext>,
}

impl OwnedEvent {
    pub(crate) fn new(
        name: Arc<str>,
        args: Arc<EventArgs>,
        context: Option<ListenerContext>,
    ) -> Self {
        Self {
            name,
            args,
            context,
        }
    }

    /// Full event name, including any namespace prefix.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All positional arguments.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Argument at `index`, if present.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Deserialize the argument at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Payload`] if the argument is missing or does
    /// not match `T`.
    pub fn arg_as<T: DeserializeOwned>(&self, index: usize) -> Result<T, ListenerError> {
        decode_arg(&self.args, index)
    }

    /// The context the listener was registered with, if it has type `T`.
    #[must_use]
    pub fn context<T: Any>(&self) -> Option<&T> {
        let context: &(dyn Any + Send + Sync) = &**self.context.as_ref()?;
        context.downcast_ref::<T>()
    }
}

impl fmt::Debug for OwnedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedEvent")
            .field("name", &self.name)
            .field("args", &self.args)
            .field("has_context", &self.context.is_some())
            .finish()
    }
}

fn decode_arg<T: DeserializeOwned>(args: &[Value], index: usize) -> Result<T, ListenerError> {
    let value = args
        .get(index)
        .ok_or_else(|| ListenerError::Payload(format!("missing argument {index}")))?;
    Ok(T::deserialize(value)?)
}
