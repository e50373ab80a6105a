//! # Table Configuration Interface
//!
//! The planner reads a small number of tuning switches from the table-level
//! configuration of the session that is being optimized. Access goes through the
//! read-only `TableConfig` trait so that the satisfaction engine stays a pure function of
//! its inputs: the handle is passed in explicitly, never looked up from global state.
//!
//! ## Options
//!
//! Each switch is described by a typed `ConfigOption` that pairs the string key with the
//! default used when the key is absent or cannot be parsed.
//!
//! - `SHUFFLE_BY_PARTIAL_KEY_ENABLED` (`table.optimizer.shuffle-by-partial-key-enabled`,
//!   default `false`): allow an aggregate to accept a hash requirement on a non-prefix
//!   subset of its grouping keys, shuffling its input on that subset only.

use std::collections::HashMap;
use tracing::warn;

/// A typed configuration key with its default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigOption<T> {
    pub key: &'static str,
    pub default: T,
}

pub const SHUFFLE_BY_PARTIAL_KEY_ENABLED: ConfigOption<bool> = ConfigOption {
    key: "table.optimizer.shuffle-by-partial-key-enabled",
    default: false,
};

/// Read-only access to table-level configuration.
pub trait TableConfig: Send + Sync {
    /// Raw string value for `key`, if set.
    fn get_raw(&self, key: &str) -> Option<&str>;

    fn get_bool(&self, option: &ConfigOption<bool>) -> bool {
        match self.get_raw(option.key) {
            None => option.default,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    warn!(
                        "Invalid boolean '{}' for '{}', using default {}",
                        raw, option.key, option.default
                    );
                    option.default
                }
            },
        }
    }

    fn shuffle_by_partial_key_enabled(&self) -> bool {
        self.get_bool(&SHUFFLE_BY_PARTIAL_KEY_ENABLED)
    }
}

/// Map-backed configuration, populated programmatically.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTableConfig {
    values: HashMap<String, String>,
}

impl InMemoryTableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Overlay `overrides` on top of this configuration.
    pub fn merged(&self, overrides: &HashMap<String, String>) -> Self {
        let mut merged = self.clone();
        merged
            .values
            .extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

impl TableConfig for InMemoryTableConfig {
    fn get_raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_key_defaults_to_disabled() {
        assert!(!InMemoryTableConfig::new().shuffle_by_partial_key_enabled());
    }

    #[test]
    fn test_bool_parsing() {
        let config = InMemoryTableConfig::new().with(SHUFFLE_BY_PARTIAL_KEY_ENABLED.key, " TRUE ");
        assert!(config.shuffle_by_partial_key_enabled());

        let config = InMemoryTableConfig::new().with(SHUFFLE_BY_PARTIAL_KEY_ENABLED.key, "yes");
        assert!(!config.shuffle_by_partial_key_enabled());
    }

    #[test]
    fn test_merged_overrides_win() {
        let base = InMemoryTableConfig::new().with(SHUFFLE_BY_PARTIAL_KEY_ENABLED.key, "false");
        let overrides =
            HashMap::from([(SHUFFLE_BY_PARTIAL_KEY_ENABLED.key.to_string(), "true".to_string())]);
        assert!(base.merged(&overrides).shuffle_by_partial_key_enabled());
        assert!(!base.shuffle_by_partial_key_enabled());
    }
}
