//! In-memory item collection.
//!
//! Items keep insertion order. Lookup is a linear scan; the catalog is
//! expected to hold at most a few thousand records.

use crate::domain::{AppError, Item, RecordKind, Result};

/// Ordered collection of items with unique identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStore {
    items: Vec<Item>,
}

impl ItemStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a store from decoded records, rejecting duplicate identifiers.
    ///
    /// # Errors
    /// Returns `DuplicateId` for the first repeated identifier.
    pub fn from_items(items: Vec<Item>) -> Result<Self> {
        let mut store = Self::new();
        for item in items {
            store.insert(item)?;
        }
        Ok(store)
    }

    /// Add a new available item.
    ///
    /// # Errors
    /// Returns `DuplicateId` if the identifier is already present.
    pub fn add(&mut self, title: &str, author: &str, identifier: &str) -> Result<()> {
        self.insert(Item::new(title, author, identifier))
    }

    fn insert(&mut self, item: Item) -> Result<()> {
        if self.contains(&item.identifier) {
            return Err(AppError::DuplicateId {
                kind: RecordKind::Item,
                id: item.identifier,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove an item and hand it back.
    ///
    /// # Errors
    /// Returns `NotFound` if no item has this identifier.
    pub fn remove(&mut self, identifier: &str) -> Result<Item> {
        let pos = self
            .position(identifier)
            .ok_or_else(|| AppError::item_not_found(identifier))?;
        Ok(self.items.remove(pos))
    }

    /// Look up an item.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.identifier == identifier)
    }

    /// Whether an item with this identifier exists.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.position(identifier).is_some()
    }

    /// Mark an item as held.
    ///
    /// # Errors
    /// Returns `NotFound` if no item has this identifier.
    pub fn mark_held(&mut self, identifier: &str) -> Result<()> {
        self.set_held(identifier, true)
    }

    /// Mark an item as available.
    ///
    /// # Errors
    /// Returns `NotFound` if no item has this identifier.
    pub fn mark_available(&mut self, identifier: &str) -> Result<()> {
        self.set_held(identifier, false)
    }

    fn set_held(&mut self, identifier: &str, held: bool) -> Result<()> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.identifier == identifier)
            .ok_or_else(|| AppError::item_not_found(identifier))?;
        item.held = held;
        Ok(())
    }

    /// All items in insertion order.
    #[must_use]
    pub fn list_all(&self) -> &[Item] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn position(&self, identifier: &str) -> Option<usize> {
        self.items.iter().position(|i| i.identifier == identifier)
    }
}
