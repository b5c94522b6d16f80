//! Dispatcher configuration.

use serde::{Deserialize, Serialize};

/// Default advisory cap on listeners per event.
pub const DEFAULT_MAX_LISTENERS: usize = 50;

/// How `on`/`once` react to an invalid registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Log an error and hand back an inert subscription.
    #[default]
    Permissive,
    /// Return [`EventError::InvalidListener`](crate::EventError::InvalidListener).
    Strict,
}

/// Settings applied when a dispatcher is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Listener count per event at which a leak warning is logged (0 = never).
    #[serde(default = "default_max_listeners")]
    pub max_listeners: usize,
    /// Log every subscribe, unsubscribe and emit at debug level.
    #[serde(default)]
    pub debug: bool,
    /// Handling of invalid registrations.
    #[serde(default)]
    pub validation: ValidationMode,
}

fn default_max_listeners() -> usize {
    DEFAULT_MAX_LISTENERS
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_listeners: DEFAULT_MAX_LISTENERS,
            debug: false,
            validation: ValidationMode::default(),
        }
    }
}

impl DispatcherConfig {
    /// Set the listener cap.
    #[must_use]
    pub fn with_max_listeners(mut self, max_listeners: usize) -> Self {
        self.max_listeners = max_listeners;
        self
    }

    /// Enable debug logging.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the validation mode.
    #[must_use]
    pub fn with_validation(mut self, validation: ValidationMode) -> Self {
        self.validation = validation;
        self
    }
}

#[cfg(feature = "config")]
impl From<&morais_config::EventsSection> for DispatcherConfig {
    fn from(section: &morais_config::EventsSection) -> Self {
        Self {
            max_listeners: section.max_listeners,
            debug: section.debug,
            validation: if section.strict {
                ValidationMode::Strict
            } else {
                ValidationMode::Permissive
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatcherConfig::default();
        assert_eq!(config.max_listeners, 50);
        assert!(!config.debug);
        assert_eq!(config.validation, ValidationMode::Permissive);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: DispatcherConfig =
            serde_json::from_str(r#"{"validation":"strict"}"#).unwrap();
        assert_eq!(config.max_listeners, DEFAULT_MAX_LISTENERS);
        assert_eq!(config.validation, ValidationMode::Strict);
    }

    #[test]
    fn test_builder() {
        let config = DispatcherConfig::default()
            .with_max_listeners(3)
            .with_debug(true)
            .with_validation(ValidationMode::Strict);
        assert_eq!(config.max_listeners, 3);
        assert!(config.debug);
        assert_eq!(config.validation, ValidationMode::Strict);
    }
}
