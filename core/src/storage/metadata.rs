use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::settings::SequencerSettings;
use crate::storage::{Error, Result};

/// Contents of `.sequencer/config.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub(crate) struct VaultConfig {
    /// A unique identifier for the vault.
    pub(crate) id: Uuid,
    /// Format version, for future migrations.
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) settings: SequencerSettings,
}

impl VaultConfig {
    pub(crate) fn new() -> Self {
        VaultConfig {
            id: Uuid::new_v4(),
            version: 1,
            settings: SequencerSettings::default(),
        }
    }
}

pub(crate) async fn read_vault_config(path: &Path) -> Result<VaultConfig> {
    let content = fs::read(path).await.map_err(|e| {
        warn!("Failed to read vault config file '{}': {}", path.display(), e);
        Error::InvalidVaultConfig(path.to_path_buf())
    })?;

    serde_json::from_slice(&content).map_err(|e| {
        warn!("Failed to parse vault config file '{}': {}", path.display(), e);
        Error::InvalidVaultConfig(path.to_path_buf())
    })
}

pub(crate) async fn write_vault_config(path: &Path, config: &VaultConfig) -> Result<()> {
    let content = serde_json::to_string_pretty(config).map_err(Error::Config)?;
    fs::write(path, content).await.map_err(Error::Io)?;
    debug!("Vault config written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn config_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = VaultConfig::new();
        config.settings.reciprocal_links = false;

        write_vault_config(&path, &config).await.unwrap();
        assert_eq!(read_vault_config(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn missing_settings_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let id = Uuid::new_v4();
        fs::write(&path, format!(r#"{{"id":"{id}","version":1}}"#)).await.unwrap();

        let config = read_vault_config(&path).await.unwrap();
        assert_eq!(config.id, id);
        assert_eq!(config.settings, SequencerSettings::default());
    }

    #[tokio::test]
    async fn garbage_is_invalid_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").await.unwrap();

        assert!(matches!(read_vault_config(&path).await, Err(Error::InvalidVaultConfig(_))));
        assert!(matches!(
            read_vault_config(&dir.path().join("missing.json")).await,
            Err(Error::InvalidVaultConfig(_))
        ));
    }
}
