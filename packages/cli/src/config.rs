use anyhow::Context;
use blockpage_editor::{BlockRegistry, EditorConfig, DEFAULT_CONFIG_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `blockpage.config.json` as seen by the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(flatten)]
    pub editor: EditorConfig,

    /// Extra block definitions, relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_definitions: Option<String>,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
                .with_context(|| format!("Invalid config {}", config_path.display()))
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        // Runs the editor's own validation
        EditorConfig::from_json(json)?;
        Ok(config)
    }

    /// Built-in blocks plus any configured definitions file
    pub fn registry(&self, cwd: &str) -> anyhow::Result<BlockRegistry> {
        let mut registry = BlockRegistry::builtin();

        if let Some(file) = &self.block_definitions {
            let path = Path::new(cwd).join(file);
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Cannot read block definitions {}", path.display()))?;
            let count = registry
                .extend_from_json(&content)
                .with_context(|| format!("Invalid block definitions {}", path.display()))?;
            tracing::debug!(count, path = %path.display(), "Loaded block definitions");
        }

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "historyLimit": 100,
            "maxNestingDepth": 3,
            "blockDefinitions": "blocks.json"
        }"#;

        let config = Config::from_json(json).unwrap();
        assert_eq!(config.editor.history_limit, 100);
        assert_eq!(config.editor.version_limit, 20);
        assert_eq!(config.editor.max_nesting_depth, Some(3));
        assert_eq!(config.block_definitions.as_deref(), Some("blocks.json"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Config::from_json(r#"{ "versionLimit": 0 }"#).is_err());
    }

    #[test]
    fn test_load_with_block_definitions() {
        let dir = TempDir::new().unwrap();
        let cwd = dir.path().to_str().unwrap();

        fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "blockDefinitions": "blocks.json" }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("blocks.json"),
            r#"{ "quote": { "name": "Quote", "category": "content" } }"#,
        )
        .unwrap();

        let config = Config::load(cwd).unwrap();
        let registry = config.registry(cwd).unwrap();
        assert!(registry.contains("quote"));
        assert!(registry.contains("hero"));
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path().to_str().unwrap()).unwrap();

        assert_eq!(config.editor, EditorConfig::default());
        assert!(config.block_definitions.is_none());
    }
}
