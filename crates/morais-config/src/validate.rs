//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Upper bound for `events.max_listeners`.
pub const MAX_LISTENERS_UPPER_BOUND: usize = 10_000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_events(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_events(config: &Config) -> ConfigResult<()> {
    if config.events.max_listeners > MAX_LISTENERS_UPPER_BOUND {
        return Err(ConfigError::ValidationError {
            field: "events.max_listeners".to_owned(),
            message: format!(
                "max_listeners {} exceeds the limit of {MAX_LISTENERS_UPPER_BOUND}",
                config.events.max_listeners
            ),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let logging = &config.logging;

    if !LOG_LEVELS.contains(&logging.level.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unknown level '{}'; expected one of: {}",
                logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if !LOG_FORMATS.contains(&logging.format.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unknown format '{}'; expected one of: {}",
                logging.format,
                LOG_FORMATS.join(", ")
            ),
        });
    }

    if let Some(empty) = logging.directives.iter().position(|d| d.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: format!("logging.directives[{empty}]"),
            message: "directive must not be empty".to_owned(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_max_listeners_bound() {
        let mut config = Config::default();
        config.events.max_listeners = MAX_LISTENERS_UPPER_BOUND;
        assert!(validate(&config).is_ok());

        config.events.max_listeners = 10_001;
        assert_eq!(field_of(validate(&config)), "events.max_listeners");

        config.events.max_listeners = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_unknown_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.level");

        config.logging.level = "WARN".to_owned();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_unknown_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }

    #[test]
    fn test_empty_directive() {
        let mut config = Config::default();
        config.logging.directives = vec!["morais_events=debug".to_owned(), " ".to_owned()];
        assert_eq!(field_of(validate(&config)), "logging.directives[1]");
    }
}
