//! Domain layer - records, in-memory stores and error types.
//!
//! This layer contains pure domain models and collections
//! without any external dependencies (filesystem, terminal).

pub mod borrower_store;
pub mod config;
pub mod error;
pub mod item_store;
pub mod models;

pub use borrower_store::BorrowerStore;
pub use config::{AppConfig, BorrowerRemoval, CatalogConfig, StartupPolicy};
pub use error::{AppError, RecordKind, Result};
pub use item_store::ItemStore;
pub use models::{Borrower, Item};
