//! Shared test harness for integration tests.

use std::collections::HashMap;

use morais_config::{Config, ResolvedConfig};
use morais_events::{DispatcherConfig, EventDispatcher};
use morais_telemetry::LogConfig;
use morais_test::{init_test_logging, test_config_file};

/// A dispatcher built the way an application would build it: config file
/// and environment resolved first, then converted into component settings.
#[allow(dead_code)]
pub struct TestHarness {
    /// The dispatcher under test.
    pub dispatcher: EventDispatcher,
    /// The resolved configuration it was built from.
    pub resolved: ResolvedConfig,
    /// Log settings derived from the same configuration.
    pub log_config: LogConfig,
}

#[allow(dead_code)]
impl TestHarness {
    /// Build from embedded defaults only.
    pub fn new() -> Self {
        Self::from_toml("", &[])
    }

    /// Build from a config file body plus an explicit environment.
    pub fn from_toml(toml: &str, env: &[(&str, &str)]) -> Self {
        init_test_logging("warn");

        let file = test_config_file(toml);
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let resolved =
            Config::load_with_env(Some(file.path()), &env).expect("config should resolve");

        let dispatcher =
            EventDispatcher::with_config(&DispatcherConfig::from(&resolved.config.events));
        let log_config = LogConfig::from(&resolved.config.logging);

        Self {
            dispatcher,
            resolved,
            log_config,
        }
    }
}
