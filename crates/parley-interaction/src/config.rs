//! Configuration file management for Parley.
//!
//! Supports reading capability credentials from
//! `~/.config/parley/secret.json`, with environment variables as fallback
//! (see [`crate::claude_api::ClaudeApiCapability::try_from_env`]).

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::capability::CapabilityError;

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub anthropic: Option<AnthropicConfig>,
}

/// Anthropic API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Loads the secret configuration file from ~/.config/parley/secret.json
pub fn load_secret_config() -> Result<SecretConfig, CapabilityError> {
    let config_path = get_config_path()?;
    load_secret_config_from(&config_path)
}

/// Loads a secret configuration file from an explicit path.
pub fn load_secret_config_from(config_path: &PathBuf) -> Result<SecretConfig, CapabilityError> {
    if !config_path.exists() {
        return Err(CapabilityError::Config(format!(
            "Configuration file not found at: {}",
            config_path.display()
        )));
    }

    let content = fs::read_to_string(config_path).map_err(|e| {
        CapabilityError::Config(format!(
            "Failed to read configuration file at {}: {}",
            config_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        CapabilityError::Config(format!(
            "Failed to parse configuration file at {}: {}",
            config_path.display(),
            e
        ))
    })
}

/// Returns the path to the configuration file: ~/.config/parley/secret.json
fn get_config_path() -> Result<PathBuf, CapabilityError> {
    let home = dirs::home_dir()
        .ok_or_else(|| CapabilityError::Config("Could not determine home directory".to_string()))?;
    Ok(home.join(".config").join("parley").join("secret.json"))
}
