//! Inspector configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use fmrc_inventory::InventoryConfig;

/// Load the inventory configuration.
///
/// A YAML file, when given, replaces the environment entirely; missing keys
/// take their defaults.
pub fn load_config(path: Option<&Path>) -> Result<InventoryConfig> {
    let config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        }
        None => InventoryConfig::from_env(),
    };

    config.validate()?;
    Ok(config)
}
