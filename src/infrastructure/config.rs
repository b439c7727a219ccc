//! Configuration file management.
//!
//! Handles loading TOML configuration files and writing the default one.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# Lending Catalog Configuration
# Auto-generated - edit as needed

[storage]
# Custom data directory (optional, defaults to ~/.lending-catalog)
# data_dir = "/custom/path"

# Backing file names, relative to the data directory
items_file = "books.txt"
borrowers_file = "users.txt"

[catalog]
# What to do with stored records at startup: "load_existing" or "reset_to_defaults"
startup = "load_existing"

# Only the borrower holding an item may return it
strict_returns = false

# Removing a borrower: "release_held" returns their items, "keep_held" leaves them borrowed
borrower_removal = "release_held"
"#;

/// Load configuration from an explicit path, or from the default location.
///
/// A missing file yields the default configuration.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = path.map_or_else(config_file_path, Path::to_path_buf);

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        tracing::debug!(path = %config_path.display(), "No configuration file, using defaults");
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Create the default configuration file if it doesn't exist.
///
/// Returns `true` if a file was written.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(true)
}

/// Get the path to the default configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    AppConfig::default().config_file_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BorrowerRemoval, StartupPolicy};
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.storage.items_file, "books.txt");
        assert_eq!(config.catalog.startup, StartupPolicy::LoadExisting);
        assert_eq!(config.catalog.borrower_removal, BorrowerRemoval::ReleaseHeld);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[catalog]\nstartup = \"reset_to_defaults\"\nstrict_returns = true\n",
        )
        .unwrap();

        let loaded = load_config(Some(&config_path)).unwrap();

        assert_eq!(loaded.catalog.startup, StartupPolicy::ResetToDefaults);
        assert!(loaded.catalog.strict_returns);
        assert_eq!(loaded.storage.borrowers_file, "users.txt");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(!loaded.catalog.strict_returns);
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[catalog]\nborrower_removal = \"shred\"\n").unwrap();

        assert!(matches!(
            load_config_from_file(&config_path),
            Err(AppError::Config { .. })
        ));
    }

    #[test]
    fn test_ensure_config_exists_writes_once() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("sub").join("config.toml");

        assert!(ensure_config_exists(&config_path).unwrap());
        assert!(!ensure_config_exists(&config_path).unwrap());
        assert!(load_config_from_file(&config_path).is_ok());
    }
}
