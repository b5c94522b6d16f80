//! Environment variable fallbacks.
//!
//! Environment variables are **fallback**, not override: they only apply to
//! fields that no configuration file set.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources};

/// Prefix shared by every supported environment variable.
pub const ENV_PREFIX: &str = "MORAIS_";

#[derive(Debug, Clone, Copy)]
enum ValueKind {
    Integer,
    Bool,
    String,
}

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: ValueKind,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "MORAIS_EVENTS_MAX_LISTENERS",
        field_path: "events.max_listeners",
        kind: ValueKind::Integer,
    },
    EnvMapping {
        var_name: "MORAIS_EVENTS_DEBUG",
        field_path: "events.debug",
        kind: ValueKind::Bool,
    },
    EnvMapping {
        var_name: "MORAIS_EVENTS_STRICT",
        field_path: "events.strict",
        kind: ValueKind::Bool,
    },
    EnvMapping {
        var_name: "MORAIS_LOG_LEVEL",
        field_path: "logging.level",
        kind: ValueKind::String,
    },
    EnvMapping {
        var_name: "MORAIS_LOG_FORMAT",
        field_path: "logging.format",
        kind: ValueKind::String,
    },
];

/// Snapshot the process environment, keeping only `MORAIS_*` variables.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .collect()
}

/// Apply environment fallbacks to fields no file layer set.
///
/// Returns the number of variables applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a variable cannot be converted to
/// the type of its field.
pub fn apply_env_fallbacks<S: BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if matches!(sources.get(mapping.field_path), Some(ConfigLayer::File(_))) {
            continue;
        }
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        let value = coerce(mapping, raw)?;
        set_field(merged, mapping.field_path, value);
        sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
        count = count.saturating_add(1);
    }

    Ok(count)
}

fn coerce(mapping: &EnvMapping, raw: &str) -> ConfigResult<toml::Value> {
    let raw = raw.trim();
    let invalid = |expected: &str| ConfigError::EnvError {
        var_name: mapping.var_name.to_owned(),
        message: format!("expected {expected}, got '{raw}'"),
    };

    match mapping.kind {
        ValueKind::Integer => raw
            .parse::<i64>()
            .map(toml::Value::Integer)
            .map_err(|_| invalid("an integer")),
        ValueKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(toml::Value::Boolean(true)),
            "0" | "false" | "no" | "off" => Ok(toml::Value::Boolean(false)),
            _ => Err(invalid("a boolean")),
        },
        ValueKind::String => Ok(toml::Value::String(raw.to_owned())),
    }
}

/// Insert `value` at a two-level `section.field` path, creating the section.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let Some((section, field)) = path.split_once('.') else {
        return;
    };
    let Some(table) = root.as_table_mut() else {
        return;
    };
    let section = table
        .entry(section.to_owned())
        .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    if let Some(section) = section.as_table_mut() {
        section.insert(field.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn base() -> toml::Value {
        toml::from_str("[events]\nmax_listeners = 50\ndebug = false\n").unwrap()
    }

    #[test]
    fn test_env_fills_default_fields() {
        let mut merged = base();
        let mut sources = FieldSources::new();
        sources.insert("events.debug".to_owned(), ConfigLayer::Defaults);

        let applied = apply_env_fallbacks(
            &mut merged,
            &mut sources,
            &env(&[("MORAIS_EVENTS_DEBUG", "yes"), ("MORAIS_LOG_LEVEL", "debug")]),
        )
        .unwrap();

        assert_eq!(applied, 2);
        assert_eq!(merged["events"]["debug"].as_bool(), Some(true));
        assert_eq!(merged["logging"]["level"].as_str(), Some("debug"));
        assert_eq!(sources.get("events.debug"), Some(&ConfigLayer::Environment));
    }

    #[test]
    fn test_file_values_win_over_env() {
        let mut merged = base();
        let mut sources = FieldSources::new();
        sources.insert(
            "events.max_listeners".to_owned(),
            ConfigLayer::File("morais.toml".to_owned()),
        );

        let applied = apply_env_fallbacks(
            &mut merged,
            &mut sources,
            &env(&[("MORAIS_EVENTS_MAX_LISTENERS", "5")]),
        )
        .unwrap();

        assert_eq!(applied, 0);
        assert_eq!(merged["events"]["max_listeners"].as_integer(), Some(50));
    }

    #[test]
    fn test_invalid_integer() {
        let mut merged = base();
        let result = apply_env_fallbacks(
            &mut merged,
            &mut FieldSources::new(),
            &env(&[("MORAIS_EVENTS_MAX_LISTENERS", "lots")]),
        );

        assert!(matches!(
            result,
            Err(ConfigError::EnvError { ref var_name, .. })
                if var_name == "MORAIS_EVENTS_MAX_LISTENERS"
        ));
    }

    #[test]
    fn test_invalid_bool() {
        let mut merged = base();
        let result = apply_env_fallbacks(
            &mut merged,
            &mut FieldSources::new(),
            &env(&[("MORAIS_EVENTS_STRICT", "maybe")]),
        );
        assert!(matches!(result, Err(ConfigError::EnvError { .. })));
    }

    #[test]
    fn test_unrelated_vars_ignored() {
        let mut merged = base();
        let applied = apply_env_fallbacks(
            &mut merged,
            &mut FieldSources::new(),
            &env(&[("MORAIS_UNKNOWN", "1"), ("HOME", "/root")]),
        )
        .unwrap();
        assert_eq!(applied, 0);
    }
}
