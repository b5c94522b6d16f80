//! Registry introspection.

use serde::{Deserialize, Serialize};

/// Listener count of one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStats {
    /// Event name.
    pub name: String,
    /// Registered listeners.
    pub listeners: usize,
}

/// Snapshot of a dispatcher's registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatcherStats {
    /// Events with at least one listener.
    pub total_events: usize,
    /// Listeners across all events.
    pub total_listeners: usize,
    /// Advisory per-event listener cap.
    pub max_listeners: usize,
    /// Per-event breakdown, sorted by name.
    pub events: Vec<EventStats>,
}
