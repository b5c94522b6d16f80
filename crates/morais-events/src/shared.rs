//! Process-wide dispatcher slot.
//!
//! Construction stays side-effect free: the application's composition root
//! builds one dispatcher and installs it here. Page-level code that cannot
//! be handed the dispatcher directly reads it back with [`get`].

use std::sync::OnceLock;

use tracing::debug;

use crate::dispatcher::EventDispatcher;
use crate::error::{EventError, EventResult};

static SHARED: OnceLock<EventDispatcher> = OnceLock::new();

/// Install the shared dispatcher.
///
/// # Errors
///
/// Returns [`EventError::SharedAlreadyInstalled`] if a dispatcher was
/// already installed (or created by [`get_or_init`]).
pub fn install(dispatcher: EventDispatcher) -> EventResult<()> {
    SHARED
        .set(dispatcher)
        .map_err(|_| EventError::SharedAlreadyInstalled)?;
    debug!("Shared event dispatcher installed");
    Ok(())
}

/// The shared dispatcher, if one was installed.
#[must_use]
pub fn get() -> Option<&'static EventDispatcher> {
    SHARED.get()
}

/// The shared dispatcher, creating a default one if none was installed.
pub fn get_or_init() -> &'static EventDispatcher {
    SHARED.get_or_init(EventDispatcher::new)
}
