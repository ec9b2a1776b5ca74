//! Configuration for run inventory construction.

use serde::{Deserialize, Serialize};

use crate::error::{InventoryError, Result};

/// Configuration for building run inventories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Finalize distinct runs in parallel.
    pub parallel_runs: bool,

    /// Size of a dedicated worker pool. `None` uses the global rayon pool.
    pub worker_threads: Option<usize>,

    /// Inserted between a colliding vertical coordinate name and its suffix.
    pub vert_name_separator: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            parallel_runs: true,
            worker_threads: None,
            vert_name_separator: String::new(),
        }
    }
}

impl InventoryConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FMRC_PARALLEL_RUNS") {
            config.parallel_runs = parse_bool(&val);
        }

        if let Ok(val) = std::env::var("FMRC_WORKER_THREADS") {
            if let Ok(threads) = val.parse() {
                config.worker_threads = Some(threads);
            }
        }

        if let Ok(val) = std::env::var("FMRC_VERT_NAME_SEPARATOR") {
            config.vert_name_separator = val;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == Some(0) {
            return Err(InventoryError::invalid_config("worker_threads must be > 0"));
        }

        if self
            .vert_name_separator
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(InventoryError::invalid_config(
                "vert_name_separator must not contain whitespace or control characters",
            ));
        }

        Ok(())
    }

    /// Name given to the `ordinal`-th later pool entry sharing `name`.
    pub fn suffixed_name(&self, name: &str, ordinal: usize) -> String {
        format!("{}{}{}", name, self.vert_name_separator, ordinal)
    }
}

fn parse_bool(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = InventoryConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.parallel_runs);
        assert_eq!(config.suffixed_name("level", 2), "level2");
    }

    #[test]
    fn test_zero_worker_threads_rejected() {
        let config = InventoryConfig {
            worker_threads: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(InventoryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_separator_in_suffix() {
        let config = InventoryConfig {
            vert_name_separator: "_".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.suffixed_name("isobaric", 1), "isobaric_1");

        let bad = InventoryConfig {
            vert_name_separator: " ".to_string(),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: InventoryConfig = serde_json::from_str(r#"{"worker_threads": 4}"#).unwrap();
        assert_eq!(config.worker_threads, Some(4));
        assert!(config.parallel_runs);
        assert_eq!(config.vert_name_separator, "");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("nope"));
    }
}
