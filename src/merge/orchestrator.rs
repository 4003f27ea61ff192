//! Merge orchestrator: exporting the ledger and importing foreign envelopes
//!
//! Import is a single linear pass with no retry and no rollback:
//! operations already applied when an error occurs remain applied
//! (at-least-once). One bad record never aborts the whole import; its
//! error is collected into the result summary instead. Skip-duplicates is
//! evaluated before conflict handling, and a conflict is only surfaced
//! when the caller supplied a resolver to consult.

use chrono::Utc;

use crate::audit::AuditLogger;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{LedgerEntry, NewEntry};
use crate::storage::Storage;

use super::dedup::{find_duplicates, DuplicateCandidate};
use super::envelope::{
    budget_from_value, category_name_from_value, entry_from_value, ExportData, ExportEnvelope,
    EXPORT_VERSION,
};

/// The caller's decision for one conflicting duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// Keep the stored entry; drop the imported one
    KeepExisting,
    /// Replace the stored entry with the imported one
    KeepImported,
    /// Keep both as separate records
    KeepBoth,
}

/// Callback consulted for each conflicting duplicate
pub type ConflictResolver<'a> = Box<dyn FnMut(&DuplicateCandidate) -> ConflictResolution + 'a>;

/// Options controlling an import
#[derive(Default)]
pub struct ImportOptions<'a> {
    /// Skip every duplicate-key match without consulting any resolver
    pub skip_duplicates: bool,
    /// Resolver for conflicting duplicates; when absent, conflicts are
    /// treated as plain duplicates
    pub resolve_conflicts: Option<ConflictResolver<'a>>,
}

/// Summary of one import run
#[derive(Debug, Default)]
pub struct MergeResult {
    /// Entries created
    pub imported: usize,
    /// Entries skipped as duplicates (including unresolved conflicts)
    pub duplicates: usize,
    /// Conflicts that were surfaced to a resolver
    pub conflicts: Vec<DuplicateCandidate>,
    /// Per-item failure descriptions
    pub errors: Vec<String>,
}

/// Drives export and merge-import against the storage layer
///
/// Dependencies are composed once at construction; nothing is resolved
/// mid-operation.
pub struct MergeOrchestrator<'a> {
    storage: &'a Storage,
    audit: &'a AuditLogger,
}

impl<'a> MergeOrchestrator<'a> {
    /// Create an orchestrator over storage and an audit sink
    pub fn new(storage: &'a Storage, audit: &'a AuditLogger) -> Self {
        Self { storage, audit }
    }

    /// Produce a fresh export envelope from the current ledger
    pub fn export_account_book(&self) -> LedgerResult<ExportEnvelope> {
        let entries = self.storage.entries.get_all(None, None)?;
        let categories = self.storage.categories.get_all()?;
        let budgets = self.storage.budgets.get_all()?;
        let logs = self.audit.get_all()?;

        Ok(ExportEnvelope {
            version: EXPORT_VERSION.to_string(),
            exported_at: Some(Utc::now()),
            data: ExportData {
                accounts: entries
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<_, _>>()?,
                categories: categories
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<_, _>>()?,
                budgets: budgets
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<_, _>>()?,
                operation_logs: logs
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<_, _>>()?,
            },
        })
    }

    /// Import an envelope into the ledger
    ///
    /// Validates the envelope (aborting before any write on failure),
    /// pairs imported entries against existing ones, applies the caller's
    /// duplicate/conflict policy, then imports budgets and categories
    /// additively. Emits one audit event describing the outcome.
    pub fn import_account_book(
        &self,
        envelope: &ExportEnvelope,
        mut options: ImportOptions<'_>,
    ) -> LedgerResult<MergeResult> {
        if let Err(e) = envelope.validate() {
            self.audit
                .log_failure("importAccountBook", "ledger", "import rejected", &e.to_string());
            return Err(e);
        }

        let existing = self.storage.entries.get_all(None, None)?;

        let mut result = MergeResult::default();

        // Parse the incoming entries up front; unreadable ones become
        // per-item errors and drop out of duplicate pairing.
        let mut imported_entries: Vec<LedgerEntry> = Vec::new();
        for (index, value) in envelope.data.accounts.iter().enumerate() {
            match entry_from_value(value) {
                Ok(entry) => imported_entries.push(entry),
                Err(e) => result.errors.push(format!("entry at index {}: {}", index, e)),
            }
        }

        let candidates = find_duplicates(&existing, &imported_entries);

        for (index, incoming) in imported_entries.iter().enumerate() {
            let candidate = candidates.iter().find(|c| c.imported_index == index);

            match candidate {
                None => {
                    self.create_imported(incoming, &mut result);
                }
                Some(candidate) => {
                    if options.skip_duplicates || !candidate.is_conflict() {
                        result.duplicates += 1;
                        continue;
                    }
                    match options.resolve_conflicts.as_mut() {
                        // No resolver to consult: treat as a plain duplicate
                        None => result.duplicates += 1,
                        Some(resolver) => {
                            result.conflicts.push(candidate.clone());
                            match resolver(candidate) {
                                ConflictResolution::KeepExisting => result.duplicates += 1,
                                ConflictResolution::KeepImported => {
                                    if let Err(e) =
                                        self.storage.entries.delete(candidate.existing.id)
                                    {
                                        result.errors.push(format!(
                                            "failed to replace entry {}: {}",
                                            candidate.existing.id, e
                                        ));
                                        continue;
                                    }
                                    self.create_imported(incoming, &mut result);
                                }
                                ConflictResolution::KeepBoth => {
                                    self.create_imported(incoming, &mut result);
                                }
                            }
                        }
                    }
                }
            }
        }

        // Budgets are only ever created, never merged or overwritten; a
        // period collision is collected as an error and skipped.
        for (index, value) in envelope.data.budgets.iter().enumerate() {
            let outcome = budget_from_value(value)
                .map_err(LedgerError::Import)
                .and_then(|input| self.storage.budgets.create(input));
            if let Err(e) = outcome {
                result
                    .errors
                    .push(format!("budget at index {}: {}", index, e));
            }
        }

        // Categories are additive by name.
        for (index, value) in envelope.data.categories.iter().enumerate() {
            let outcome = category_name_from_value(value)
                .map_err(LedgerError::Import)
                .and_then(|name| self.storage.categories.create_if_absent(&name));
            if let Err(e) = outcome {
                result
                    .errors
                    .push(format!("category at index {}: {}", index, e));
            }
        }

        let content = format!(
            "imported {} entries, {} duplicates skipped",
            result.imported, result.duplicates
        );
        if result.errors.is_empty() {
            self.audit.log_success("importAccountBook", "ledger", &content);
        } else {
            self.audit.log_failure(
                "importAccountBook",
                "ledger",
                &content,
                &result.errors.join("; "),
            );
        }

        Ok(result)
    }

    fn create_imported(&self, incoming: &LedgerEntry, result: &mut MergeResult) {
        let input = NewEntry {
            amount: incoming.amount,
            date: incoming.date,
            category: incoming.category.clone(),
            notes: incoming.notes.clone(),
        };
        match self.storage.entries.create(input) {
            Ok(_) => result.imported += 1,
            Err(e) => result
                .errors
                .push(format!("failed to import entry {}: {}", incoming.id, e)),
        }
    }
}
