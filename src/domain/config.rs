//! Catalog configuration models.
//!
//! Covers where the backing files live and the policies the catalog
//! applies at startup, on returns and on borrower removal.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What the catalog does with existing data when it starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupPolicy {
    /// Load both backing files as they are.
    #[default]
    LoadExisting,
    /// Discard stored data and start from the default records.
    ResetToDefaults,
}

/// What happens to a removed borrower's held items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowerRemoval {
    /// Force-return every held item.
    #[default]
    ReleaseHeld,
    /// Leave the items marked borrowed with no holder.
    KeepHeld,
}

/// Configuration for the backing files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Item file name, relative to the data directory.
    #[serde(default = "default_items_file")]
    pub items_file: String,

    /// Borrower file name, relative to the data directory.
    #[serde(default = "default_borrowers_file")]
    pub borrowers_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            items_file: default_items_file(),
            borrowers_file: default_borrowers_file(),
        }
    }
}

fn default_items_file() -> String {
    "books.txt".to_string()
}

fn default_borrowers_file() -> String {
    "users.txt".to_string()
}

/// Catalog behavior switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Startup policy.
    #[serde(default)]
    pub startup: StartupPolicy,

    /// Only the holder may return an item.
    #[serde(default)]
    pub strict_returns: bool,

    /// Borrower removal policy.
    #[serde(default)]
    pub borrower_removal: BorrowerRemoval,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Backing file configuration.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Catalog policies.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lending-catalog")
    }

    /// Get the item file path.
    #[must_use]
    pub fn items_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.items_file)
    }

    /// Get the borrower file path.
    #[must_use]
    pub fn borrowers_path(&self) -> PathBuf {
        self.data_dir().join(&self.storage.borrowers_file)
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.storage.items_file, "books.txt");
        assert_eq!(config.storage.borrowers_file, "users.txt");
        assert_eq!(config.catalog.startup, StartupPolicy::LoadExisting);
        assert_eq!(config.catalog.borrower_removal, BorrowerRemoval::ReleaseHeld);
        assert!(!config.catalog.strict_returns);
    }

    #[test]
    fn test_paths_follow_data_dir() {
        let mut config = AppConfig::default();
        config.storage.data_dir = Some(PathBuf::from("/srv/catalog"));

        assert_eq!(config.items_path(), PathBuf::from("/srv/catalog/books.txt"));
        assert_eq!(
            config.borrowers_path(),
            PathBuf::from("/srv/catalog/users.txt")
        );
        assert_eq!(
            config.config_file_path(),
            PathBuf::from("/srv/catalog/config.toml")
        );
    }
}
