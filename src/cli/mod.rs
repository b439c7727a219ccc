//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the catalog, plus
//! the interactive numbered menu.

pub mod menu;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::OutputFormat;
use crate::domain::{AppConfig, StartupPolicy};
use crate::infrastructure::config_file_path;

pub use menu::run_menu;

/// Lending Catalog - track items, borrowers and who holds what.
///
/// Without a command, starts the interactive menu.
#[derive(Parser, Debug)]
#[command(name = "catalog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format: table, json, or plain.
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Configuration file (defaults to config.toml in the data directory).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the backing files.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Discard stored records and start from the defaults.
    #[arg(long)]
    pub reset: bool,

    /// Only the borrower holding an item may return it.
    #[arg(long)]
    pub strict_returns: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Interactive numbered menu.
    Menu,

    /// List all items.
    Items,

    /// List all borrowers.
    Borrowers,

    /// Show one item.
    Item {
        /// Item identifier.
        id: String,
    },

    /// Show one borrower.
    Borrower {
        /// Borrower identifier.
        id: String,
    },

    /// Add a new item.
    AddItem {
        /// Item title.
        title: String,

        /// Item author.
        author: String,

        /// Unique identifier (ISBN).
        id: String,
    },

    /// Remove an item.
    RemoveItem {
        /// Item identifier.
        id: String,
    },

    /// Register a new borrower.
    Register {
        /// Unique borrower identifier.
        id: String,

        /// Borrower name.
        name: String,
    },

    /// Remove a borrower.
    RemoveBorrower {
        /// Borrower identifier.
        id: String,
    },

    /// Lend an item to a borrower.
    Borrow {
        /// Borrower identifier.
        borrower: String,

        /// Item identifier.
        item: String,
    },

    /// Take an item back.
    Return {
        /// Borrower identifier.
        borrower: String,

        /// Item identifier.
        item: String,
    },

    /// Replace all records with the default items and borrowers.
    Reset,

    /// Check that item availability matches borrower records.
    Check,

    /// Show the files being used.
    Paths,

    /// Write a default configuration file.
    InitConfig,
}

impl Cli {
    /// Parse the output format argument.
    pub fn output_format(&self) -> Result<OutputFormat, String> {
        self.format.parse()
    }

    /// Configuration file to read.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        if let Some(path) = &self.config {
            return path.clone();
        }
        self.data_dir
            .as_ref()
            .map_or_else(config_file_path, |dir| dir.join("config.toml"))
    }

    /// Apply command-line overrides on top of the file configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = Some(dir.clone());
        }
        if self.reset {
            config.catalog.startup = StartupPolicy::ResetToDefaults;
        }
        if self.strict_returns {
            config.catalog.strict_returns = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_defaults_to_menu() {
        let cli = Cli::try_parse_from(["catalog"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(cli.output_format(), Ok(OutputFormat::Table)));
    }

    #[test]
    fn test_parse_borrow() {
        let cli = Cli::try_parse_from(["catalog", "borrow", "001", "978-0451524935"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Borrow {
                borrower: "001".into(),
                item: "978-0451524935".into(),
            })
        );
    }

    #[test]
    fn test_parse_add_item_with_spaces() {
        let cli = Cli::try_parse_from([
            "catalog",
            "add-item",
            "To Kill a Mockingbird",
            "Harper Lee",
            "978-0061120084",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::AddItem { ref title, .. }) if title == "To Kill a Mockingbird"
        ));
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "catalog",
            "--data-dir",
            "/tmp/catalog",
            "--reset",
            "--strict-returns",
            "items",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.data_dir(), PathBuf::from("/tmp/catalog"));
        assert_eq!(config.catalog.startup, StartupPolicy::ResetToDefaults);
        assert!(config.catalog.strict_returns);
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/catalog/config.toml"));
    }

    #[test]
    fn test_every_command_parses() {
        let cases: [&[&str]; 15] = [
            &["menu"],
            &["items"],
            &["borrowers"],
            &["item", "D1"],
            &["borrower", "001"],
            &["add-item", "Dune", "Frank Herbert", "D1"],
            &["remove-item", "D1"],
            &["register", "003", "Carol"],
            &["remove-borrower", "003"],
            &["borrow", "001", "D1"],
            &["return", "001", "D1"],
            &["reset"],
            &["check"],
            &["paths"],
            &["init-config"],
        ];
        for args in cases {
            let cli = Cli::try_parse_from(std::iter::once("catalog").chain(args.iter().copied()))
                .unwrap_or_else(|e| panic!("{args:?}: {e}"));
            assert!(cli.command.is_some(), "{args:?}");
        }
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let cli = Cli::try_parse_from([
            "catalog",
            "--config",
            "/etc/catalog.toml",
            "--data-dir",
            "/tmp/catalog",
            "paths",
        ])
        .unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("/etc/catalog.toml"));
    }
}
