use std::collections::HashMap;

/// Which configuration layer a value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Compiled-in defaults (`defaults.toml`).
    Defaults,
    /// A configuration file, by path.
    File(String),
    /// Environment variable fallback.
    Environment,
}

impl std::fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::File(path) => write!(f, "file ({path})"),
            Self::Environment => write!(f, "environment variable"),
        }
    }
}

/// Tracks which layer set each field's value, keyed by dotted path.
pub type FieldSources = HashMap<String, ConfigLayer>;

/// Deep-merge `overlay` into `base`, recording which layer set each leaf.
///
/// Tables merge per key; scalars and arrays from the overlay replace the
/// base value.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = join_path(prefix, key);
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                    record_leaves(overlay_val, &path, layer, sources);
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            record_leaves(overlay, prefix, layer, sources);
        },
    }
}

/// Record every leaf path under `val` as set by `layer`.
pub fn record_leaves(
    val: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            record_leaves(child, &join_path(prefix, key), layer, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), layer.clone());
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_merge_overrides_scalars_and_keeps_siblings() {
        let mut base = parse("[events]\nmax_listeners = 50\ndebug = false\n");
        let overlay = parse("[events]\ndebug = true\n");
        let layer = ConfigLayer::File("morais.toml".to_owned());
        let mut sources = FieldSources::new();
        record_leaves(&base, "", &ConfigLayer::Defaults, &mut sources);

        deep_merge_tracking(&mut base, &overlay, "", &layer, &mut sources);

        assert_eq!(base["events"]["debug"].as_bool(), Some(true));
        assert_eq!(base["events"]["max_listeners"].as_integer(), Some(50));
        assert_eq!(sources.get("events.debug"), Some(&layer));
        assert_eq!(
            sources.get("events.max_listeners"),
            Some(&ConfigLayer::Defaults)
        );
    }

    #[test]
    fn test_merge_records_new_tables() {
        let mut base = parse("[events]\ndebug = false\n");
        let overlay = parse("[logging]\nlevel = \"warn\"\ndirectives = [\"a=trace\"]\n");
        let layer = ConfigLayer::File("x.toml".to_owned());
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", &layer, &mut sources);

        assert_eq!(base["logging"]["level"].as_str(), Some("warn"));
        assert_eq!(sources.get("logging.level"), Some(&layer));
        assert_eq!(sources.get("logging.directives"), Some(&layer));
        assert!(!sources.contains_key("events.debug"));
    }

    #[test]
    fn test_arrays_are_replaced() {
        let mut base = parse("directives = [\"a=debug\", \"b=debug\"]\n");
        let overlay = parse("directives = [\"c=trace\"]\n");
        let mut sources = FieldSources::new();

        deep_merge_tracking(
            &mut base,
            &overlay,
            "",
            &ConfigLayer::Environment,
            &mut sources,
        );

        let directives = base["directives"].as_array().unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].as_str(), Some("c=trace"));
    }

    #[test]
    fn test_layer_display() {
        assert_eq!(ConfigLayer::Defaults.to_string(), "defaults");
        assert_eq!(
            ConfigLayer::File("/etc/morais.toml".to_owned()).to_string(),
            "file (/etc/morais.toml)"
        );
    }
}
