use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dispatcher settings.
    pub events: EventsSection,
    /// Log subscriber settings.
    pub logging: LoggingSection,
}

/// `[events]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsSection {
    /// Listener count per event at which a leak warning is logged (0 = never).
    pub max_listeners: usize,
    /// Log every subscribe, unsubscribe and emit at debug level.
    pub debug: bool,
    /// Reject invalid registrations instead of logging them.
    pub strict: bool,
}

impl Default for EventsSection {
    fn default() -> Self {
        Self {
            max_listeners: 50,
            debug: false,
            strict: false,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Base level filter: `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,
    /// Output format: `pretty`, `compact`, `json` or `full`.
    pub format: String,
    /// Extra `EnvFilter` directives such as `morais_events=trace`.
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directives: Vec::new(),
        }
    }
}
