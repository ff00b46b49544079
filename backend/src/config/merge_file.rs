use crate::error::ConfigError;
use common::model::config::MergeConfig;
use log::info;
use std::fs;
use std::path::Path;

/// Reads a merge configuration saved by [`save_merge_config`].
pub fn load_merge_config(path: &Path) -> Result<MergeConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&text)?;
    info!("Loaded merge configuration from {}", path.display());
    Ok(config)
}

/// Writes `config` as indented JSON, replacing any existing file.
pub fn save_merge_config(path: &Path, config: &MergeConfig) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Saved merge configuration to {}", path.display());
    Ok(())
}
