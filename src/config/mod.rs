//! Configuration management for Stager

pub mod schema;

pub use schema::Config;

use crate::error::{StagerError, StagerResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File name of the project-local config overlay
pub const LOCAL_CONFIG_FILE: &str = ".stager.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stager")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stager")
    }

    /// Get the default artifact cache directory
    pub fn artifacts_dir() -> PathBuf {
        Self::state_dir().join("artifacts")
    }

    /// Get the audit log path
    pub fn audit_log_path() -> PathBuf {
        Self::state_dir().join("audit.log")
    }

    /// Find a project-local config in `start` or any of its ancestors
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(LOCAL_CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Load the global config with an optional local overlay merged on top
    ///
    /// A missing global file means defaults.
    pub async fn load_merged(&self, local: Option<&Path>) -> StagerResult<Config> {
        let mut merged = if self.config_path.exists() {
            Self::read_table(&self.config_path).await?
        } else {
            debug!("Config file not found, using defaults");
            toml::Table::new()
        };

        if let Some(local) = local {
            let overlay = Self::read_table(local).await?;
            merge_tables(&mut merged, overlay);
        }

        let source = local.unwrap_or(&self.config_path);
        toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| StagerError::ConfigInvalid {
                path: source.to_path_buf(),
                reason: e.to_string(),
            })
    }

    async fn read_table(path: &Path) -> StagerResult<toml::Table> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StagerError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| StagerError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> StagerResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            StagerError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> StagerResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StagerError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep-merge `overlay` into `base`; nested tables merge, everything else replaces
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ApplyMode;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load_merged(None).await.unwrap();
        assert_eq!(config.aws.provider_domain, "amazonaws.com");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.aws.region = Some("eu-west-1".to_string());

        manager.save(&config).await.unwrap();
        let loaded = manager.load_merged(None).await.unwrap();

        assert_eq!(loaded.aws.region.as_deref(), Some("eu-west-1"));
    }

    #[tokio::test]
    async fn local_overlay_merges_tables() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        std::fs::write(
            &global,
            "[aws]\nregion = \"us-east-1\"\nprofile = \"ci\"\n[apply]\njava = \"/opt/java\"\n",
        )
        .unwrap();
        let local = temp.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&local, "[aws]\nregion = \"eu-central-1\"\n[apply]\nmode = \"direct\"\n")
            .unwrap();

        let manager = ConfigManager::with_path(global);
        let config = manager.load_merged(Some(&local)).await.unwrap();

        assert_eq!(config.aws.region.as_deref(), Some("eu-central-1"));
        assert_eq!(config.aws.profile.as_deref(), Some("ci"));
        assert_eq!(config.apply.mode, ApplyMode::Direct);
        assert_eq!(config.apply.java, "/opt/java");
    }

    #[tokio::test]
    async fn invalid_config_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[apply]\nmode = 3\n").unwrap();

        let err = ConfigManager::with_path(path.clone()).load_merged(None).await.unwrap_err();
        match err {
            StagerError::ConfigInvalid { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn find_local_config_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join(LOCAL_CONFIG_FILE), "").unwrap();

        let found = ConfigManager::find_local_config(&nested).unwrap();
        assert_eq!(found, temp.path().join(LOCAL_CONFIG_FILE));
    }
}
