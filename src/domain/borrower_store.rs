//! In-memory borrower collection.

use crate::domain::{AppError, Borrower, RecordKind, Result};

/// Ordered collection of borrowers with unique identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorrowerStore {
    borrowers: Vec<Borrower>,
}

impl BorrowerStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            borrowers: Vec::new(),
        }
    }

    /// Build a store from decoded records, rejecting duplicate identifiers.
    ///
    /// # Errors
    /// Returns `DuplicateId` for the first repeated identifier.
    pub fn from_borrowers(borrowers: Vec<Borrower>) -> Result<Self> {
        let mut store = Self::new();
        for borrower in borrowers {
            store.insert(borrower)?;
        }
        Ok(store)
    }

    /// Register a borrower holding nothing.
    ///
    /// # Errors
    /// Returns `DuplicateId` if the identifier is already registered.
    pub fn register(&mut self, identifier: &str, name: &str) -> Result<()> {
        self.insert(Borrower::new(identifier, name))
    }

    fn insert(&mut self, borrower: Borrower) -> Result<()> {
        if self.find(&borrower.identifier).is_some() {
            return Err(AppError::DuplicateId {
                kind: RecordKind::Borrower,
                id: borrower.identifier,
            });
        }
        self.borrowers.push(borrower);
        Ok(())
    }

    /// Remove a borrower and hand it back.
    ///
    /// # Errors
    /// Returns `NotFound` if no borrower has this identifier.
    pub fn remove(&mut self, identifier: &str) -> Result<Borrower> {
        let pos = self
            .borrowers
            .iter()
            .position(|b| b.identifier == identifier)
            .ok_or_else(|| AppError::borrower_not_found(identifier))?;
        Ok(self.borrowers.remove(pos))
    }

    /// Look up a borrower.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<&Borrower> {
        self.borrowers.iter().find(|b| b.identifier == identifier)
    }

    fn find_mut(&mut self, identifier: &str) -> Result<&mut Borrower> {
        self.borrowers
            .iter_mut()
            .find(|b| b.identifier == identifier)
            .ok_or_else(|| AppError::borrower_not_found(identifier))
    }

    /// Append an item to a borrower's held list.
    ///
    /// # Errors
    /// Returns `NotFound` if no borrower has this identifier.
    pub fn add_held_item(&mut self, identifier: &str, item_id: &str) -> Result<()> {
        self.find_mut(identifier)?.held_items.push(item_id.to_string());
        Ok(())
    }

    /// Drop every occurrence of an item from a borrower's held list.
    ///
    /// Returns how many entries were removed.
    ///
    /// # Errors
    /// Returns `NotFound` if no borrower has this identifier.
    pub fn remove_held_item(&mut self, identifier: &str, item_id: &str) -> Result<usize> {
        let borrower = self.find_mut(identifier)?;
        let before = borrower.held_items.len();
        borrower.held_items.retain(|id| id != item_id);
        Ok(before - borrower.held_items.len())
    }

    /// The first borrower whose held list contains the item.
    #[must_use]
    pub fn holder_of(&self, item_id: &str) -> Option<&Borrower> {
        self.borrowers.iter().find(|b| b.holds(item_id))
    }

    /// Drop an item from every borrower's held list.
    ///
    /// Returns the identifiers of the borrowers that listed it.
    pub fn release_everywhere(&mut self, item_id: &str) -> Vec<String> {
        let mut released = Vec::new();
        for borrower in &mut self.borrowers {
            if borrower.holds(item_id) {
                borrower.held_items.retain(|id| id != item_id);
                released.push(borrower.identifier.clone());
            }
        }
        released
    }

    /// All borrowers in registration order.
    #[must_use]
    pub fn list_all(&self) -> &[Borrower] {
        &self.borrowers
    }

    /// Number of borrowers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.borrowers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> BorrowerStore {
        let mut store = BorrowerStore::new();
        store.register("001", "Alice").unwrap();
        store.register("002", "Bob").unwrap();
        store
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut store = store();
        let err = store.register("001", "Mallory").unwrap_err();

        assert!(matches!(err, AppError::DuplicateId { kind: RecordKind::Borrower, .. }));
        assert_eq!(store.len(), 2);
        assert_eq!(store.find("001").unwrap().name, "Alice");
    }

    #[test]
    fn test_held_items_keep_borrow_order() {
        let mut store = store();
        store.add_held_item("001", "b").unwrap();
        store.add_held_item("001", "a").unwrap();

        assert_eq!(store.find("001").unwrap().held_items, ["b", "a"]);
    }

    #[test]
    fn test_remove_held_item_drops_all_occurrences() {
        let mut store = store();
        store.add_held_item("001", "a").unwrap();
        store.add_held_item("001", "b").unwrap();
        store.add_held_item("001", "a").unwrap();

        assert_eq!(store.remove_held_item("001", "a").unwrap(), 2);
        assert_eq!(store.find("001").unwrap().held_items, ["b"]);
        assert_eq!(store.remove_held_item("001", "zzz").unwrap(), 0);
        assert!(store.remove_held_item("999", "a").is_err());
    }

    #[test]
    fn test_holder_and_release_everywhere() {
        let mut store = store();
        store.add_held_item("002", "a").unwrap();

        assert_eq!(store.holder_of("a").unwrap().identifier, "002");
        assert!(store.holder_of("b").is_none());

        assert_eq!(store.release_everywhere("a"), ["002"]);
        assert!(store.holder_of("a").is_none());
    }

    #[test]
    fn test_remove() {
        let mut store = store();
        let removed = store.remove("001").unwrap();

        assert_eq!(removed.name, "Alice");
        assert_eq!(store.list_all().len(), 1);
        assert!(matches!(store.remove("001"), Err(AppError::NotFound { .. })));
    }
}
