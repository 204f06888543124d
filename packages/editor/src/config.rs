//! # Editor Configuration
//!
//! `blockpage.config.json` in the working directory. Every key is optional;
//! a missing file means all defaults.

use crate::errors::EditorError;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::versions::DEFAULT_VERSION_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "blockpage.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Undo levels kept (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Named versions kept
    #[serde(default = "default_version_limit")]
    pub version_limit: usize,

    /// Maximum ancestors a block may have (`null` = unlimited)
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: Option<usize>,

    /// Seed for generated block ids (derived from the session id if absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_prefix: Option<String>,
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_version_limit() -> usize {
    DEFAULT_VERSION_LIMIT
}

fn default_max_nesting_depth() -> Option<usize> {
    Some(8)
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults
    pub fn load(dir: &Path) -> Result<Self, EditorError> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), EditorError> {
        if self.version_limit == 0 {
            return Err(EditorError::Config(
                "versionLimit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            version_limit: default_version_limit(),
            max_nesting_depth: default_max_nesting_depth(),
            id_prefix: None,
        }
    }
}
