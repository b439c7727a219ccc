//! Output formatting for catalog listings.
//!
//! Supports multiple output formats: table, JSON and the plain one-line
//! listing of the interactive menu.

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};

use crate::domain::{AppError, Borrower, Item, Result};

use super::{CatalogSummary, Inconsistency};

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Boxed table.
    #[default]
    Table,
    /// JSON format for programmatic use.
    Json,
    /// One line per record.
    Plain,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "plain" | "text" => Ok(Self::Plain),
            _ => Err(format!("Unknown format: {s}. Use: table, json, plain")),
        }
    }
}

/// Formats items in the requested format.
///
/// # Errors
/// Returns error if JSON serialization fails.
pub fn format_items(items: &[Item], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_items_table(items)),
        OutputFormat::Json => to_json(items),
        OutputFormat::Plain => Ok(format_items_plain(items)),
    }
}

/// Formats borrowers in the requested format.
///
/// # Errors
/// Returns error if JSON serialization fails.
pub fn format_borrowers(borrowers: &[Borrower], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_borrowers_table(borrowers)),
        OutputFormat::Json => to_json(borrowers),
        OutputFormat::Plain => Ok(format_borrowers_plain(borrowers)),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(AppError::json)
}

/// Formats a table listing of items.
pub fn format_items_table(items: &[Item]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Identifier", "Title", "Author", "Status"]);

    for item in items {
        table.add_row(vec![
            item.identifier.clone(),
            truncate(&item.title, 40),
            truncate(&item.author, 30),
            item.status().to_string(),
        ]);
    }

    table.to_string()
}

/// Formats a table listing of borrowers.
pub fn format_borrowers_table(borrowers: &[Borrower]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Name", "Held", "Items"]);

    for borrower in borrowers {
        let held = if borrower.held_items.is_empty() {
            "-".to_string()
        } else {
            borrower.held_items.join(", ")
        };

        table.add_row(vec![
            borrower.identifier.clone(),
            truncate(&borrower.name, 30),
            borrower.held_items.len().to_string(),
            held,
        ]);
    }

    table.to_string()
}

/// Formats items one per line.
pub fn format_items_plain(items: &[Item]) -> String {
    let mut out = String::from("=== Library Books ===\n");
    for item in items {
        out.push_str(&format!(
            "Title: {} | Author: {} | ISBN: {} | Status: {}\n",
            item.title,
            item.author,
            item.identifier,
            item.status()
        ));
    }
    out
}

/// Formats borrowers one per line.
pub fn format_borrowers_plain(borrowers: &[Borrower]) -> String {
    let mut out = String::from("=== Registered Users ===\n");
    for borrower in borrowers {
        out.push_str(&format!(
            "ID: {} | Name: {}",
            borrower.identifier, borrower.name
        ));
        if !borrower.held_items.is_empty() {
            out.push_str(&format!(" | Borrowed: {}", borrower.held_items.join(", ")));
        }
        out.push('\n');
    }
    out
}

/// Formats catalog counts for display.
pub fn format_summary(summary: &CatalogSummary) -> String {
    format!(
        "{}\n  Items: {}\n  Available: {}\n  Borrowed: {}\n  Borrowers: {}",
        "📚 Catalog".bold(),
        summary.items.to_string().cyan(),
        summary.available.to_string().green(),
        summary.held.to_string().yellow(),
        summary.borrowers.to_string().cyan()
    )
}

/// Formats audit findings.
pub fn format_issues(issues: &[Inconsistency]) -> String {
    if issues.is_empty() {
        return format!("{} Catalog is consistent", "✓".green().bold());
    }

    let mut out = format!(
        "{} {} inconsistencies found\n",
        "⚠".yellow().bold(),
        issues.len()
    );
    for issue in issues {
        out.push_str(&format!("  - {issue}\n"));
    }
    out
}

/// Truncates a string to max length with ellipsis.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
