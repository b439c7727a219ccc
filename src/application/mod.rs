//! Application layer - use cases and orchestration.
//!
//! This layer contains the record codec, the catalog manager that keeps
//! items and borrowers consistent, and output formatting.

pub mod catalog;
pub mod codec;
pub mod formatter;

pub use catalog::{Catalog, CatalogOptions, CatalogSummary, Inconsistency};
pub use formatter::{format_borrowers, format_issues, format_items, format_summary, OutputFormat};
