//! Infrastructure layer - external adapters (filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod persistence;

pub use config::{config_file_path, ensure_config_exists, load_config};
pub use persistence::{Collection, FileGateway, LineGateway};
