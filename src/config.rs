//! Configuration module, loads the JSON configuration file

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::parser::{MixedConditionals, ParseOptions, DEFAULT_MAX_DEPTH};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse JSON config file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A destination action gated by an FQL filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Human-readable label, defaults to the action name.
    #[serde(default)]
    pub name: Option<String>,
    pub partner_action: String,
    /// FQL text deciding whether the action runs.
    #[serde(default)]
    pub subscribe: String,
}

impl SubscriptionConfig {
    pub fn new(partner_action: &str, subscribe: &str) -> Self {
        Self {
            name: None,
            partner_action: partner_action.to_string(),
            subscribe: subscribe.to_string(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.partner_action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FqlConfig {
    pub max_depth: usize,
    pub mixed_conditionals: MixedConditionals,
    pub subscriptions: Vec<SubscriptionConfig>,
}

impl Default for FqlConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            mixed_conditionals: MixedConditionals::default(),
            subscriptions: Vec::new(),
        }
    }
}

impl FqlConfig {
    /// Loads the configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConfigError::NotFound(path_ref.to_path_buf()));
        }

        let content = fs::read_to_string(path_ref).map_err(|source| ConfigError::Io {
            path: path_ref.to_path_buf(),
            source,
        })?;

        let config: FqlConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path_ref.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            path = %path_ref.display(),
            subscriptions = config.subscriptions.len(),
            "loaded FQL config"
        );
        Ok(config)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_depth,
            mixed_conditionals: self.mixed_conditionals,
        }
    }
}
