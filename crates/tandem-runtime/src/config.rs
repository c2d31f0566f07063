//! Demo configuration

use std::ops::RangeInclusive;
use std::path::PathBuf;
use tandem_core::constants::{DEFAULT_PLUGIN_PATH, DEFAULT_PLUGIN_SYMBOL, MAX_WORKERS};
use tandem_core::{env_get, env_get_path, env_get_str, ConfigError};

/// Configuration for the three demonstration flows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// Shared library opened by the plugin flow
    pub plugin_path: PathBuf,

    /// Symbol resolved and invoked in that library
    pub plugin_symbol: String,

    /// Workers launched by the fan-out flow (numbered from 1)
    pub workers: usize,

    /// First index scheduled by the deferred flow
    pub deferred_first: usize,

    /// Last index scheduled by the deferred flow (inclusive)
    pub deferred_last: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            plugin_path: PathBuf::from(DEFAULT_PLUGIN_PATH),
            plugin_symbol: DEFAULT_PLUGIN_SYMBOL.to_string(),
            workers: 5,
            deferred_first: 5,
            deferred_last: 10,
        }
    }
}

impl DemoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by environment variables
    ///
    /// - `TANDEM_PLUGIN_PATH` - plugin library path
    /// - `TANDEM_PLUGIN_SYMBOL` - symbol to invoke
    /// - `TANDEM_WORKERS` - fan-out worker count
    ///
    /// Unset or unparseable variables keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            plugin_path: env_get_path("TANDEM_PLUGIN_PATH", DEFAULT_PLUGIN_PATH),
            plugin_symbol: env_get_str("TANDEM_PLUGIN_SYMBOL", DEFAULT_PLUGIN_SYMBOL),
            workers: env_get("TANDEM_WORKERS", defaults.workers),
            ..defaults
        }
    }

    pub fn plugin_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.plugin_path = path.into();
        self
    }

    pub fn plugin_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.plugin_symbol = symbol.into();
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    pub fn deferred_range(mut self, first: usize, last: usize) -> Self {
        self.deferred_first = first;
        self.deferred_last = last;
        self
    }

    /// Indices the deferred flow schedules, in registration order
    pub fn deferred_indices(&self) -> RangeInclusive<usize> {
        self.deferred_first..=self.deferred_last
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers > MAX_WORKERS {
            return Err(ConfigError::TooManyWorkers(self.workers));
        }
        if self.plugin_symbol.is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if self.deferred_first > self.deferred_last {
            return Err(ConfigError::InvalidDeferredRange {
                first: self.deferred_first,
                last: self.deferred_last,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DemoConfig::default();
        assert_eq!(config.plugin_path, PathBuf::from("./plugins/example_plugin.so"));
        assert_eq!(config.plugin_symbol, "Print");
        assert_eq!(config.workers, 5);
        assert_eq!(config.deferred_indices().collect::<Vec<_>>(), vec![5, 6, 7, 8, 9, 10]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = DemoConfig::new()
            .plugin_path("/tmp/p.so")
            .plugin_symbol("Hello")
            .workers(0)
            .deferred_range(1, 1);
        assert_eq!(config.plugin_path, PathBuf::from("/tmp/p.so"));
        assert_eq!(config.plugin_symbol, "Hello");
        assert_eq!(config.workers, 0);
        assert_eq!(config.deferred_indices().count(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            DemoConfig::new().workers(MAX_WORKERS + 1).validate(),
            Err(ConfigError::TooManyWorkers(MAX_WORKERS + 1))
        );
        assert_eq!(
            DemoConfig::new().plugin_symbol("").validate(),
            Err(ConfigError::EmptySymbol)
        );
        assert_eq!(
            DemoConfig::new().deferred_range(10, 5).validate(),
            Err(ConfigError::InvalidDeferredRange { first: 10, last: 5 })
        );
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("TANDEM_WORKERS", "7");
        std::env::set_var("TANDEM_PLUGIN_SYMBOL", "Greet");
        let config = DemoConfig::from_env();
        std::env::remove_var("TANDEM_WORKERS");
        std::env::remove_var("TANDEM_PLUGIN_SYMBOL");

        assert_eq!(config.workers, 7);
        assert_eq!(config.plugin_symbol, "Greet");
        assert_eq!(config.deferred_first, 5);
    }
}
