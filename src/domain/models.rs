//! Domain models for the lending catalog.

use serde::{Deserialize, Serialize};

/// A lendable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item title.
    pub title: String,
    /// Item author.
    pub author: String,
    /// Catalog-wide unique identifier (an ISBN in practice).
    pub identifier: String,
    /// Whether a borrower currently holds the item.
    pub held: bool,
}

impl Item {
    /// Create a new, available item.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            identifier: identifier.into(),
            held: false,
        }
    }

    /// Whether the item can be borrowed.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !self.held
    }

    /// Human-readable availability.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        if self.is_available() {
            "Available"
        } else {
            "Borrowed"
        }
    }
}

/// A registered borrower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Borrower {
    /// Catalog-wide unique identifier.
    pub identifier: String,
    /// Display name.
    pub name: String,
    /// Identifiers of held items, in borrow order.
    #[serde(default)]
    pub held_items: Vec<String>,
}

impl Borrower {
    /// Create a borrower holding nothing.
    #[must_use]
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            held_items: Vec::new(),
        }
    }

    /// Whether this borrower's held list contains the item.
    #[must_use]
    pub fn holds(&self, item_id: &str) -> bool {
        self.held_items.iter().any(|id| id == item_id)
    }
}
