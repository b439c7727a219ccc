//! Catalog manager - the single owner of both collections.
//!
//! Every mutation runs against the in-memory stores and is then flushed
//! with a full rewrite of both backing files. If the mutation or the flush
//! fails, the stores are restored to their state before the call, so an
//! item is held exactly when one borrower lists it even across I/O errors.

use std::fmt;

use serde::Serialize;

use crate::domain::{
    AppError, Borrower, BorrowerRemoval, BorrowerStore, CatalogConfig, Item, ItemStore, Result,
    StartupPolicy,
};
use crate::infrastructure::{Collection, LineGateway};

use super::codec::{self, validate_item_id, validate_text};

/// Items installed by [`Catalog::reset_to_defaults`]: title, author, identifier.
const DEFAULT_ITEMS: [(&str, &str, &str); 2] = [
    ("1984", "George Orwell", "978-0451524935"),
    ("To Kill a Mockingbird", "Harper Lee", "978-0061120084"),
];

/// Borrowers installed by [`Catalog::reset_to_defaults`]: identifier, name.
const DEFAULT_BORROWERS: [(&str, &str); 2] = [("001", "Alice"), ("002", "Bob")];

/// Behavior switches for a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Reject returns by a borrower who does not hold the item.
    pub strict_returns: bool,
    /// What removing a borrower does to their held items.
    pub borrower_removal: BorrowerRemoval,
}

impl From<&CatalogConfig> for CatalogOptions {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            strict_returns: config.strict_returns,
            borrower_removal: config.borrower_removal,
        }
    }
}

/// A disagreement between item availability and borrower held lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// Item is marked borrowed but nobody lists it.
    HeldWithoutHolder { item_id: String },
    /// Item is marked available but borrowers list it.
    AvailableButListed {
        item_id: String,
        borrowers: Vec<String>,
    },
    /// Item is listed by more than one borrower.
    MultipleHolders {
        item_id: String,
        borrowers: Vec<String>,
    },
    /// Borrower lists an item the catalog does not have.
    UnknownItem {
        borrower_id: String,
        item_id: String,
    },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeldWithoutHolder { item_id } => {
                write!(f, "item {item_id} is borrowed but no borrower holds it")
            }
            Self::AvailableButListed { item_id, borrowers } => write!(
                f,
                "item {item_id} is available but held by {}",
                borrowers.join(", ")
            ),
            Self::MultipleHolders { item_id, borrowers } => write!(
                f,
                "item {item_id} is held by several borrowers: {}",
                borrowers.join(", ")
            ),
            Self::UnknownItem {
                borrower_id,
                item_id,
            } => write!(f, "borrower {borrower_id} holds unknown item {item_id}"),
        }
    }
}

/// Counts for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    /// Number of items.
    pub items: usize,
    /// Items currently available.
    pub available: usize,
    /// Items currently borrowed.
    pub held: usize,
    /// Number of registered borrowers.
    pub borrowers: usize,
}

/// The lending catalog.
pub struct Catalog<G: LineGateway> {
    items: ItemStore,
    borrowers: BorrowerStore,
    gateway: G,
    options: CatalogOptions,
}

impl<G: LineGateway> Catalog<G> {
    /// Open a catalog over a gateway, applying the startup policy.
    ///
    /// # Errors
    /// Returns error if the stored data cannot be read or decoded, or the
    /// default records cannot be written.
    pub fn open(gateway: G, startup: StartupPolicy, options: CatalogOptions) -> Result<Self> {
        let mut catalog = Self {
            items: ItemStore::new(),
            borrowers: BorrowerStore::new(),
            gateway,
            options,
        };

        match startup {
            StartupPolicy::LoadExisting => catalog.load_all()?,
            StartupPolicy::ResetToDefaults => catalog.reset_to_defaults()?,
        }

        Ok(catalog)
    }

    /// Replace the in-memory state with the contents of both backing files.
    ///
    /// Nothing changes unless every line decodes.
    ///
    /// # Errors
    /// Returns `Persistence` on read failure and `MalformedRecord` for the
    /// first undecodable line.
    pub fn load_all(&mut self) -> Result<()> {
        let item_lines = self.gateway.read_lines(Collection::Items)?;
        let borrower_lines = self.gateway.read_lines(Collection::Borrowers)?;

        let items = ItemStore::from_items(codec::decode_item_lines(&item_lines)?)?;
        let borrowers =
            BorrowerStore::from_borrowers(codec::decode_borrower_lines(&borrower_lines)?)?;

        self.items = items;
        self.borrowers = borrowers;

        tracing::info!(
            items = self.items.len(),
            borrowers = self.borrowers.len(),
            "Catalog loaded"
        );

        for issue in self.audit() {
            tracing::warn!(%issue, "Inconsistent catalog state");
        }

        Ok(())
    }

    /// Rewrite both backing files from the in-memory state.
    ///
    /// # Errors
    /// Returns `Persistence` if either file cannot be written.
    pub fn save_all(&mut self) -> Result<()> {
        let item_lines = self
            .items
            .list_all()
            .iter()
            .map(codec::encode_item)
            .collect::<Result<Vec<_>>>()?;
        let borrower_lines = self
            .borrowers
            .list_all()
            .iter()
            .map(codec::encode_borrower)
            .collect::<Result<Vec<_>>>()?;

        self.gateway.write_lines(Collection::Items, &item_lines)?;
        self.gateway
            .write_lines(Collection::Borrowers, &borrower_lines)?;

        tracing::debug!(
            items = item_lines.len(),
            borrowers = borrower_lines.len(),
            "Catalog saved"
        );
        Ok(())
    }

    /// Discard everything and install the default items and borrowers.
    ///
    /// # Errors
    /// Returns `Persistence` if the defaults cannot be written.
    pub fn reset_to_defaults(&mut self) -> Result<()> {
        self.commit(|items, borrowers| {
            *items = ItemStore::new();
            *borrowers = BorrowerStore::new();
            for (title, author, id) in DEFAULT_ITEMS {
                items.add(title, author, id)?;
            }
            for (id, name) in DEFAULT_BORROWERS {
                borrowers.register(id, name)?;
            }
            Ok(())
        })?;

        tracing::info!("Catalog reset to defaults");
        Ok(())
    }

    /// Add a new, available item.
    ///
    /// # Errors
    /// Returns `InvalidField`, `DuplicateId`, or `Persistence`.
    pub fn add_item(&mut self, title: &str, author: &str, identifier: &str) -> Result<()> {
        require_identifier("item identifier", identifier)?;
        validate_item_id("item identifier", identifier)?;
        validate_text("title", title)?;
        validate_text("author", author)?;

        self.commit(|items, _| items.add(title, author, identifier))?;

        tracing::info!(item_id = identifier, title, "Item added");
        Ok(())
    }

    /// Remove an item. A borrowed item is also dropped from its holder's list.
    ///
    /// # Errors
    /// Returns `NotFound` or `Persistence`.
    pub fn remove_item(&mut self, identifier: &str) -> Result<Item> {
        let (item, released) = self.commit(|items, borrowers| {
            let item = items.remove(identifier)?;
            let released = borrowers.release_everywhere(identifier);
            Ok((item, released))
        })?;

        if !released.is_empty() {
            tracing::warn!(
                item_id = identifier,
                borrowers = %released.join(", "),
                "Removed item was still held"
            );
        }
        tracing::info!(item_id = identifier, "Item removed");
        Ok(item)
    }

    /// Register a new borrower.
    ///
    /// # Errors
    /// Returns `InvalidField`, `DuplicateId`, or `Persistence`.
    pub fn register_borrower(&mut self, identifier: &str, name: &str) -> Result<()> {
        require_identifier("borrower identifier", identifier)?;
        validate_text("borrower identifier", identifier)?;
        validate_text("name", name)?;

        self.commit(|_, borrowers| borrowers.register(identifier, name))?;

        tracing::info!(borrower_id = identifier, name, "Borrower registered");
        Ok(())
    }

    /// Remove a borrower, applying the configured removal policy to their
    /// held items.
    ///
    /// # Errors
    /// Returns `NotFound` or `Persistence`.
    pub fn remove_borrower(&mut self, identifier: &str) -> Result<Borrower> {
        let policy = self.options.borrower_removal;

        let borrower = self.commit(|items, borrowers| {
            let borrower = borrowers.remove(identifier)?;
            if policy == BorrowerRemoval::ReleaseHeld {
                for item_id in &borrower.held_items {
                    if items.contains(item_id) && borrowers.holder_of(item_id).is_none() {
                        items.mark_available(item_id)?;
                    }
                }
            }
            Ok(borrower)
        })?;

        if !borrower.held_items.is_empty() {
            match policy {
                BorrowerRemoval::ReleaseHeld => tracing::info!(
                    borrower_id = identifier,
                    items = %borrower.held_items.join(", "),
                    "Released items of removed borrower"
                ),
                BorrowerRemoval::KeepHeld => tracing::warn!(
                    borrower_id = identifier,
                    items = %borrower.held_items.join(", "),
                    "Removed borrower's items stay borrowed"
                ),
            }
        }
        tracing::info!(borrower_id = identifier, "Borrower removed");
        Ok(borrower)
    }

    /// Lend an item to a borrower.
    ///
    /// Both entities are looked up before anything changes; a failed call
    /// leaves the catalog untouched.
    ///
    /// # Errors
    /// Returns `NotFound` for a missing borrower or item, `AlreadyHeld` if
    /// the item is out, or `Persistence`.
    pub fn borrow_item(&mut self, borrower_id: &str, item_id: &str) -> Result<()> {
        if self.borrowers.find(borrower_id).is_none() {
            return Err(AppError::borrower_not_found(borrower_id));
        }
        let item = self
            .items
            .find(item_id)
            .ok_or_else(|| AppError::item_not_found(item_id))?;

        if item.held {
            let holder = self
                .borrowers
                .holder_of(item_id)
                .map_or_else(|| "an unknown borrower".to_string(), |b| b.identifier.clone());
            return Err(AppError::AlreadyHeld {
                item_id: item_id.to_string(),
                holder,
            });
        }

        let stale = self.commit(|items, borrowers| {
            let stale = borrowers.release_everywhere(item_id);
            items.mark_held(item_id)?;
            borrowers.add_held_item(borrower_id, item_id)?;
            Ok(stale)
        })?;

        if !stale.is_empty() {
            tracing::warn!(
                item_id,
                borrowers = %stale.join(", "),
                "Dropped stale entries for available item"
            );
        }
        tracing::info!(borrower_id, item_id, "Item borrowed");
        Ok(())
    }

    /// Take an item back.
    ///
    /// Unless strict returns are enabled, any registered borrower may return
    /// any item. The item is dropped from whichever borrower held it.
    ///
    /// # Errors
    /// Returns `NotFound` for a missing borrower or item,
    /// `NotHeldByBorrower` in strict mode, or `Persistence`.
    pub fn return_item(&mut self, borrower_id: &str, item_id: &str) -> Result<()> {
        let holds = self
            .borrowers
            .find(borrower_id)
            .ok_or_else(|| AppError::borrower_not_found(borrower_id))?
            .holds(item_id);
        if !self.items.contains(item_id) {
            return Err(AppError::item_not_found(item_id));
        }

        if !holds {
            if self.options.strict_returns {
                return Err(AppError::NotHeldByBorrower {
                    borrower_id: borrower_id.to_string(),
                    item_id: item_id.to_string(),
                });
            }
            let holder = self.borrowers.holder_of(item_id).map(|b| b.identifier.clone());
            tracing::warn!(
                borrower_id,
                item_id,
                holder = holder.as_deref().unwrap_or("none"),
                "Item returned by a borrower who did not hold it"
            );
        }

        self.commit(|items, borrowers| {
            items.mark_available(item_id)?;
            borrowers.remove_held_item(borrower_id, item_id)?;
            borrowers.release_everywhere(item_id);
            Ok(())
        })?;

        tracing::info!(borrower_id, item_id, "Item returned");
        Ok(())
    }

    /// Copy of every item in insertion order.
    #[must_use]
    pub fn list_items(&self) -> Vec<Item> {
        self.items.list_all().to_vec()
    }

    /// Copy of every borrower in registration order.
    #[must_use]
    pub fn list_borrowers(&self) -> Vec<Borrower> {
        self.borrowers.list_all().to_vec()
    }

    /// Copy of one item.
    #[must_use]
    pub fn find_item(&self, identifier: &str) -> Option<Item> {
        self.items.find(identifier).cloned()
    }

    /// Copy of one borrower.
    #[must_use]
    pub fn find_borrower(&self, identifier: &str) -> Option<Borrower> {
        self.borrowers.find(identifier).cloned()
    }

    /// Item and borrower counts.
    #[must_use]
    pub fn summary(&self) -> CatalogSummary {
        let held = self.items.list_all().iter().filter(|i| i.held).count();
        CatalogSummary {
            items: self.items.len(),
            available: self.items.len() - held,
            held,
            borrowers: self.borrowers.len(),
        }
    }

    /// Every place where availability and held lists disagree.
    #[must_use]
    pub fn audit(&self) -> Vec<Inconsistency> {
        let mut issues = Vec::new();

        for item in self.items.list_all() {
            let holders: Vec<String> = self
                .borrowers
                .list_all()
                .iter()
                .filter(|b| b.holds(&item.identifier))
                .map(|b| b.identifier.clone())
                .collect();
            let item_id = item.identifier.clone();

            match (item.held, holders.len()) {
                (true, 0) => issues.push(Inconsistency::HeldWithoutHolder { item_id }),
                (true, 1) | (false, 0) => {}
                (true, _) => issues.push(Inconsistency::MultipleHolders {
                    item_id,
                    borrowers: holders,
                }),
                (false, _) => issues.push(Inconsistency::AvailableButListed {
                    item_id,
                    borrowers: holders,
                }),
            }
        }

        for borrower in self.borrowers.list_all() {
            for item_id in &borrower.held_items {
                if !self.items.contains(item_id) {
                    issues.push(Inconsistency::UnknownItem {
                        borrower_id: borrower.identifier.clone(),
                        item_id: item_id.clone(),
                    });
                }
            }
        }

        issues
    }

    /// Apply a mutation and flush it, restoring the previous in-memory state
    /// if either step fails.
    fn commit<T>(
        &mut self,
        mutate: impl FnOnce(&mut ItemStore, &mut BorrowerStore) -> Result<T>,
    ) -> Result<T> {
        let items_before = self.items.clone();
        let borrowers_before = self.borrowers.clone();

        let value = match mutate(&mut self.items, &mut self.borrowers) {
            Ok(value) => value,
            Err(e) => {
                self.items = items_before;
                self.borrowers = borrowers_before;
                return Err(e);
            }
        };

        if let Err(e) = self.save_all() {
            tracing::warn!(error = %e, "Save failed, rolling back in-memory change");
            self.items = items_before;
            self.borrowers = borrowers_before;
            // One file may already hold the new state.
            if let Err(resave) = self.save_all() {
                tracing::warn!(error = %resave, "Could not rewrite previous state");
            }
            return Err(e);
        }

        Ok(value)
    }

    #[cfg(test)]
    pub(crate) fn gateway(&self) -> &G {
        &self.gateway
    }
}

fn require_identifier(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidField {
            field,
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordKind;
    use crate::infrastructure::persistence::MemoryGateway;
    use crate::infrastructure::FileGateway;
    use proptest::prelude::*;
    use tempfile::tempdir;

    const ORWELL: &str = "978-0451524935";
    const LEE: &str = "978-0061120084";

    fn defaults() -> Catalog<MemoryGateway> {
        Catalog::open(
            MemoryGateway::default(),
            StartupPolicy::ResetToDefaults,
            CatalogOptions::default(),
        )
        .unwrap()
    }

    fn strict() -> Catalog<MemoryGateway> {
        Catalog::open(
            MemoryGateway::default(),
            StartupPolicy::ResetToDefaults,
            CatalogOptions {
                strict_returns: true,
                ..CatalogOptions::default()
            },
        )
        .unwrap()
    }

    fn snapshot<G: LineGateway>(catalog: &Catalog<G>) -> (Vec<String>, Vec<String>) {
        (
            catalog
                .list_items()
                .iter()
                .map(|i| codec::encode_item(i).unwrap())
                .collect(),
            catalog
                .list_borrowers()
                .iter()
                .map(|b| codec::encode_borrower(b).unwrap())
                .collect(),
        )
    }

    fn assert_consistent<G: LineGateway>(catalog: &Catalog<G>) {
        assert_eq!(catalog.audit(), Vec::<Inconsistency>::new());
    }

    #[test]
    fn test_reset_installs_defaults_and_saves() {
        let catalog = defaults();

        assert_eq!(catalog.summary().items, 2);
        assert_eq!(catalog.summary().borrowers, 2);
        assert_eq!(
            catalog.gateway().items,
            [
                "1984|George Orwell|978-0451524935|1",
                "To Kill a Mockingbird|Harper Lee|978-0061120084|1"
            ]
        );
        assert_eq!(catalog.gateway().borrowers, ["001|Alice|", "002|Bob|"]);
    }

    #[test]
    fn test_load_existing_keeps_stored_records() {
        let gateway = MemoryGateway::with_lines(&["Dune|Frank Herbert|D1|0"], &["009|Zoe|D1"]);
        let catalog =
            Catalog::open(gateway, StartupPolicy::LoadExisting, CatalogOptions::default())
                .unwrap();

        assert_eq!(catalog.list_items().len(), 1);
        assert!(catalog.find_item("D1").unwrap().held);
        assert_eq!(catalog.find_borrower("009").unwrap().held_items, ["D1"]);
        assert_eq!(catalog.gateway().writes, 0);
    }

    #[test]
    fn test_borrow_return_scenario() {
        let mut catalog = Catalog::open(
            MemoryGateway::default(),
            StartupPolicy::LoadExisting,
            CatalogOptions::default(),
        )
        .unwrap();
        catalog.register_borrower("001", "Alice").unwrap();
        catalog.register_borrower("002", "Bob").unwrap();
        catalog.add_item("1984", "George Orwell", ORWELL).unwrap();
        assert!(catalog.find_item(ORWELL).unwrap().is_available());

        catalog.borrow_item("001", ORWELL).unwrap();
        assert!(!catalog.find_item(ORWELL).unwrap().is_available());
        assert_eq!(catalog.find_borrower("001").unwrap().held_items, [ORWELL]);
        assert_consistent(&catalog);

        let before = snapshot(&catalog);
        let err = catalog.borrow_item("002", ORWELL).unwrap_err();
        assert!(matches!(err, AppError::AlreadyHeld { ref holder, .. } if holder == "001"));
        assert_eq!(snapshot(&catalog), before);

        catalog.return_item("001", ORWELL).unwrap();
        assert!(catalog.find_item(ORWELL).unwrap().is_available());
        assert!(catalog.find_borrower("001").unwrap().held_items.is_empty());
        assert_consistent(&catalog);
    }

    #[test]
    fn test_failed_borrow_changes_nothing() {
        let mut catalog = defaults();
        let writes = catalog.gateway().writes;
        let before = snapshot(&catalog);

        assert!(matches!(
            catalog.borrow_item("999", ORWELL),
            Err(AppError::NotFound {
                kind: RecordKind::Borrower,
                ..
            })
        ));
        assert!(matches!(
            catalog.borrow_item("001", "missing"),
            Err(AppError::NotFound {
                kind: RecordKind::Item,
                ..
            })
        ));

        assert_eq!(snapshot(&catalog), before);
        assert_eq!(catalog.gateway().writes, writes);
    }

    #[test]
    fn test_every_mutation_rewrites_both_files() {
        let mut catalog = defaults();
        catalog.borrow_item("002", LEE).unwrap();

        assert_eq!(
            catalog.gateway().items[1],
            "To Kill a Mockingbird|Harper Lee|978-0061120084|0"
        );
        assert_eq!(catalog.gateway().borrowers[1], "002|Bob|978-0061120084");
    }

    #[test]
    fn test_borrow_rolls_back_when_save_fails() {
        let mut catalog = defaults();
        let before = snapshot(&catalog);
        let items_on_disk = catalog.gateway().items.clone();

        catalog.gateway.fail_writes = Some(Collection::Borrowers);
        let err = catalog.borrow_item("001", ORWELL).unwrap_err();

        assert!(matches!(err, AppError::Persistence { .. }));
        assert_eq!(snapshot(&catalog), before);
        assert_consistent(&catalog);
        // The item file was rewritten with the pre-borrow state.
        assert_eq!(catalog.gateway().items, items_on_disk);
    }

    #[test]
    fn test_return_rolls_back_when_save_fails() {
        let mut catalog = defaults();
        catalog.borrow_item("001", ORWELL).unwrap();
        let before = snapshot(&catalog);

        catalog.gateway.fail_writes = Some(Collection::Items);
        assert!(catalog.return_item("001", ORWELL).is_err());

        assert_eq!(snapshot(&catalog), before);
        assert!(catalog.find_item(ORWELL).unwrap().held);
    }

    #[test]
    fn test_lenient_return_by_other_borrower() {
        let mut catalog = defaults();
        catalog.borrow_item("001", ORWELL).unwrap();

        catalog.return_item("002", ORWELL).unwrap();

        assert!(catalog.find_item(ORWELL).unwrap().is_available());
        assert!(catalog.find_borrower("001").unwrap().held_items.is_empty());
        assert_consistent(&catalog);
    }

    #[test]
    fn test_strict_return_requires_holder() {
        let mut catalog = strict();
        catalog.borrow_item("001", ORWELL).unwrap();
        let before = snapshot(&catalog);

        let err = catalog.return_item("002", ORWELL).unwrap_err();
        assert!(matches!(err, AppError::NotHeldByBorrower { .. }));
        assert_eq!(snapshot(&catalog), before);

        catalog.return_item("001", ORWELL).unwrap();
        assert!(catalog.find_item(ORWELL).unwrap().is_available());
    }

    #[test]
    fn test_return_unknown_entities() {
        let mut catalog = defaults();
        assert!(matches!(
            catalog.return_item("999", ORWELL),
            Err(AppError::NotFound {
                kind: RecordKind::Borrower,
                ..
            })
        ));
        assert!(matches!(
            catalog.return_item("001", "missing"),
            Err(AppError::NotFound {
                kind: RecordKind::Item,
                ..
            })
        ));
    }

    #[test]
    fn test_invariant_holds_across_sequence() {
        let mut catalog = defaults();
        catalog.register_borrower("003", "Carol").unwrap();
        catalog.add_item("Dune", "Frank Herbert", "D1").unwrap();

        let steps: [(&str, &str, bool); 8] = [
            ("001", ORWELL, true),
            ("002", LEE, true),
            ("003", ORWELL, true),
            ("003", "D1", true),
            ("001", ORWELL, false),
            ("003", ORWELL, true),
            ("002", "D1", false),
            ("001", "D1", true),
        ];
        for (borrower, item, borrow) in steps {
            let _ = if borrow {
                catalog.borrow_item(borrower, item)
            } else {
                catalog.return_item(borrower, item)
            };
            assert_consistent(&catalog);
        }

        assert_eq!(catalog.find_borrower("003").unwrap().held_items, [ORWELL]);
        assert_eq!(catalog.find_borrower("001").unwrap().held_items, ["D1"]);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut catalog = defaults();
        assert!(matches!(
            catalog.add_item("Copy", "Someone", ORWELL),
            Err(AppError::DuplicateId {
                kind: RecordKind::Item,
                ..
            })
        ));
        assert!(matches!(
            catalog.register_borrower("001", "Another Alice"),
            Err(AppError::DuplicateId {
                kind: RecordKind::Borrower,
                ..
            })
        ));
        assert_eq!(catalog.summary().items, 2);
        assert_eq!(catalog.summary().borrowers, 2);
    }

    #[test]
    fn test_invalid_fields_rejected_before_mutation() {
        let mut catalog = defaults();
        let writes = catalog.gateway().writes;

        assert!(matches!(
            catalog.add_item("Either|Or", "Kierkegaard", "K1"),
            Err(AppError::InvalidField { .. })
        ));
        assert!(catalog.add_item("Title", "Author", "a,b").is_err());
        assert!(catalog.add_item("Title", "Author", "  ").is_err());
        assert!(catalog.register_borrower("", "Nobody").is_err());
        assert!(catalog.register_borrower("004", "Dan|Dan").is_err());

        assert_eq!(catalog.gateway().writes, writes);
    }

    #[test]
    fn test_remove_item_releases_holder() {
        let mut catalog = defaults();
        catalog.borrow_item("001", ORWELL).unwrap();

        let removed = catalog.remove_item(ORWELL).unwrap();

        assert_eq!(removed.title, "1984");
        assert!(catalog.find_item(ORWELL).is_none());
        assert!(catalog.find_borrower("001").unwrap().held_items.is_empty());
        assert!(matches!(
            catalog.remove_item(ORWELL),
            Err(AppError::NotFound { .. })
        ));
    }

    #[test]
    fn test_remove_borrower_releases_items_by_default() {
        let mut catalog = defaults();
        catalog.borrow_item("001", ORWELL).unwrap();
        catalog.borrow_item("001", LEE).unwrap();

        let removed = catalog.remove_borrower("001").unwrap();

        assert_eq!(removed.held_items, [ORWELL, LEE]);
        assert!(catalog.find_item(ORWELL).unwrap().is_available());
        assert!(catalog.find_item(LEE).unwrap().is_available());
        assert_consistent(&catalog);
    }

    #[test]
    fn test_remove_borrower_keep_held() {
        let mut catalog = Catalog::open(
            MemoryGateway::default(),
            StartupPolicy::ResetToDefaults,
            CatalogOptions {
                borrower_removal: BorrowerRemoval::KeepHeld,
                ..CatalogOptions::default()
            },
        )
        .unwrap();
        catalog.borrow_item("001", ORWELL).unwrap();

        catalog.remove_borrower("001").unwrap();

        assert!(catalog.find_item(ORWELL).unwrap().held);
        assert_eq!(
            catalog.audit(),
            [Inconsistency::HeldWithoutHolder {
                item_id: ORWELL.to_string()
            }]
        );
    }

    #[test]
    fn test_malformed_line_aborts_load() {
        let mut catalog = defaults();
        let before = snapshot(&catalog);

        catalog.gateway.borrowers.push("broken line".to_string());
        let err = catalog.load_all().unwrap_err();

        assert!(matches!(
            err,
            AppError::MalformedRecord {
                kind: RecordKind::Borrower,
                line: 3,
                ..
            }
        ));
        assert_eq!(snapshot(&catalog), before);
    }

    #[test]
    fn test_unstorable_identifier_aborts_load() {
        let gateway = MemoryGateway::with_lines(&["B|Y|ok|1", "A|X|a,b|1"], &["001|Alice|"]);

        assert!(matches!(
            Catalog::open(gateway, StartupPolicy::LoadExisting, CatalogOptions::default()),
            Err(AppError::MalformedRecord {
                kind: RecordKind::Item,
                line: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_audit_reports_inconsistent_files() {
        let gateway = MemoryGateway::with_lines(
            &["A|X|1|0", "B|Y|2|1", "C|Z|3|0"],
            &["001|Alice|2,3,9", "002|Bob|3"],
        );
        let catalog =
            Catalog::open(gateway, StartupPolicy::LoadExisting, CatalogOptions::default())
                .unwrap();

        let issues = catalog.audit();
        assert!(issues.contains(&Inconsistency::HeldWithoutHolder {
            item_id: "1".into()
        }));
        assert!(issues.contains(&Inconsistency::AvailableButListed {
            item_id: "2".into(),
            borrowers: vec!["001".into()],
        }));
        assert!(issues.contains(&Inconsistency::MultipleHolders {
            item_id: "3".into(),
            borrowers: vec!["001".into(), "002".into()],
        }));
        assert!(issues.contains(&Inconsistency::UnknownItem {
            borrower_id: "001".into(),
            item_id: "9".into(),
        }));
    }

    #[test]
    fn test_borrow_drops_stale_entries() {
        let gateway = MemoryGateway::with_lines(&["A|X|1|1"], &["001|Alice|1", "002|Bob|"]);
        let mut catalog =
            Catalog::open(gateway, StartupPolicy::LoadExisting, CatalogOptions::default())
                .unwrap();

        catalog.borrow_item("002", "1").unwrap();

        assert!(catalog.find_borrower("001").unwrap().held_items.is_empty());
        assert_consistent(&catalog);
    }

    #[test]
    fn test_save_then_load_reproduces_state() {
        let dir = tempdir().unwrap();
        let gateway = FileGateway::new(dir.path().join("books.txt"), dir.path().join("users.txt"));

        let mut catalog = Catalog::open(
            gateway.clone(),
            StartupPolicy::ResetToDefaults,
            CatalogOptions::default(),
        )
        .unwrap();
        catalog.add_item("Dune", "Frank Herbert", "D1").unwrap();
        catalog.register_borrower("003", "Carol").unwrap();
        catalog.borrow_item("003", "D1").unwrap();
        catalog.borrow_item("003", ORWELL).unwrap();
        let saved = snapshot(&catalog);

        let reopened =
            Catalog::open(gateway, StartupPolicy::LoadExisting, CatalogOptions::default())
                .unwrap();
        assert_eq!(snapshot(&reopened), saved);
        assert_eq!(reopened.list_items(), catalog.list_items());
        assert_eq!(reopened.list_borrowers(), catalog.list_borrowers());
    }

    #[test]
    fn test_summary_counts() {
        let mut catalog = defaults();
        catalog.borrow_item("002", LEE).unwrap();

        assert_eq!(
            catalog.summary(),
            CatalogSummary {
                items: 2,
                available: 1,
                held: 1,
                borrowers: 2,
            }
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        AddItem(usize),
        RemoveItem(usize),
        Register(usize),
        RemoveBorrower(usize),
        Borrow(usize, usize),
        Return(usize, usize),
    }

    const ITEM_IDS: [&str; 4] = [ORWELL, LEE, "D1", "D2"];
    const BORROWER_IDS: [&str; 3] = ["001", "002", "003"];

    fn op() -> impl Strategy<Value = Op> {
        let item = 0..ITEM_IDS.len();
        let borrower = 0..BORROWER_IDS.len();
        prop_oneof![
            item.clone().prop_map(Op::AddItem),
            item.clone().prop_map(Op::RemoveItem),
            borrower.clone().prop_map(Op::Register),
            borrower.clone().prop_map(Op::RemoveBorrower),
            (borrower.clone(), item.clone()).prop_map(|(b, i)| Op::Borrow(b, i)),
            (borrower, item).prop_map(|(b, i)| Op::Return(b, i)),
        ]
    }

    fn apply(catalog: &mut Catalog<MemoryGateway>, op: &Op) {
        let _ = match *op {
            Op::AddItem(i) => catalog.add_item("Title", "Author", ITEM_IDS[i]),
            Op::RemoveItem(i) => catalog.remove_item(ITEM_IDS[i]).map(|_| ()),
            Op::Register(b) => catalog.register_borrower(BORROWER_IDS[b], "Name"),
            Op::RemoveBorrower(b) => catalog.remove_borrower(BORROWER_IDS[b]).map(|_| ()),
            Op::Borrow(b, i) => catalog.borrow_item(BORROWER_IDS[b], ITEM_IDS[i]),
            Op::Return(b, i) => catalog.return_item(BORROWER_IDS[b], ITEM_IDS[i]),
        };
    }

    proptest! {
        /// Any sequence of operations keeps availability and held lists in
        /// agreement, and what was saved loads back unchanged.
        #[test]
        fn operations_keep_catalog_consistent(ops in prop::collection::vec(op(), 0..40)) {
            let mut catalog = defaults();

            for op in &ops {
                apply(&mut catalog, op);
                prop_assert!(catalog.audit().is_empty(), "after {:?}: {:?}", op, catalog.audit());
            }

            let reopened = Catalog::open(
                catalog.gateway().clone(),
                StartupPolicy::LoadExisting,
                CatalogOptions::default(),
            )
            .unwrap();
            prop_assert_eq!(reopened.list_items(), catalog.list_items());
            prop_assert_eq!(reopened.list_borrowers(), catalog.list_borrowers());
        }
    }
}
