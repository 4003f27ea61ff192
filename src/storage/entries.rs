//! Ledger entry repository
//!
//! CRUD over the key-value engine through the record codec. Listing reads
//! the whole collection, decrypts each record independently (a record that
//! fails to decrypt is skipped, not fatal), sorts newest-first, and only
//! then applies offset/limit. Search and filters are full-scan in-memory
//! predicates; the encrypted blob is opaque to the store, so there is
//! nothing to index.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::crypto::SessionKey;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{EntryId, EntryPatch, LedgerEntry, NewEntry};

use super::kv::KvEngine;
use super::record::{open, seal, StorageMode};

/// Collection name in the key-value engine
const COLLECTION: &str = "accounts";

/// Repository for ledger entries
pub struct EntryRepository {
    engine: Arc<dyn KvEngine>,
    session: Arc<SessionKey>,
}

impl EntryRepository {
    /// Create a repository over the given engine and session key holder
    pub fn new(engine: Arc<dyn KvEngine>, session: Arc<SessionKey>) -> Self {
        Self { engine, session }
    }

    /// Create a new entry
    ///
    /// Validates the input, stamps id and timestamps, and persists the
    /// sealed record. The returned `StorageMode` reports whether the write
    /// was encrypted or fell back to plaintext.
    pub fn create(&self, input: NewEntry) -> LedgerResult<(LedgerEntry, StorageMode)> {
        input.validate()?;
        let entry = LedgerEntry::new(input);
        let mode = self.persist(&entry)?;
        Ok((entry, mode))
    }

    /// Get one entry by id
    ///
    /// Decryption failures propagate; the caller cannot read this record
    /// with the current session password.
    pub fn get(&self, id: EntryId) -> LedgerResult<Option<LedgerEntry>> {
        match self.engine.get(COLLECTION, &id.as_uuid().to_string())? {
            Some(value) => Ok(Some(open(value, &self.session)?)),
            None => Ok(None),
        }
    }

    /// Get all entries, newest transaction date first
    ///
    /// Records that cannot be decrypted are silently skipped so one
    /// corrupted record never makes the rest of the ledger unreadable.
    /// Offset/limit apply after the full scan and sort.
    pub fn get_all(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        let values = self.engine.get_all(COLLECTION)?;
        let mut entries: Vec<LedgerEntry> = values
            .into_iter()
            .filter_map(|value| open(value, &self.session).ok())
            .collect();

        entries.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then(b.created_at.cmp(&a.created_at))
        });

        let offset = offset.unwrap_or(0);
        let entries: Vec<LedgerEntry> = entries
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        Ok(entries)
    }

    /// Update an entry with a partial patch
    ///
    /// Preserves `id` and `created_at`, bumps `updated_at`, and re-seals
    /// under the current session password.
    pub fn update(&self, id: EntryId, patch: EntryPatch) -> LedgerResult<(LedgerEntry, StorageMode)> {
        patch.validate()?;
        let mut entry = self
            .get(id)?
            .ok_or_else(|| LedgerError::entry_not_found(id.to_string()))?;
        entry.apply(patch);
        let mode = self.persist(&entry)?;
        Ok((entry, mode))
    }

    /// Delete an entry; deleting a missing id is not an error
    pub fn delete(&self, id: EntryId) -> LedgerResult<()> {
        self.engine.delete(COLLECTION, &id.as_uuid().to_string())
    }

    /// Case-insensitive search over category and notes
    pub fn search(&self, query: &str) -> LedgerResult<Vec<LedgerEntry>> {
        let needle = query.to_lowercase();
        Ok(self
            .get_all(None, None)?
            .into_iter()
            .filter(|e| {
                e.category.to_lowercase().contains(&needle)
                    || e.notes.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// All entries in a category
    pub fn filter_by_category(&self, category: &str) -> LedgerResult<Vec<LedgerEntry>> {
        Ok(self
            .get_all(None, None)?
            .into_iter()
            .filter(|e| e.category == category)
            .collect())
    }

    /// All entries with a transaction date in [start, end]
    pub fn filter_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<Vec<LedgerEntry>> {
        Ok(self
            .get_all(None, None)?
            .into_iter()
            .filter(|e| e.date >= start && e.date <= end)
            .collect())
    }

    fn persist(&self, entry: &LedgerEntry) -> LedgerResult<StorageMode> {
        let (value, mode) = seal(entry, &self.session)?;
        self.engine
            .put(COLLECTION, &entry.id.as_uuid().to_string(), value)?;
        Ok(mode)
    }
}
