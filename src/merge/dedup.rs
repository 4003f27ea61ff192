//! Duplicate and conflict detection for ledger entries
//!
//! Pure functions, no I/O. Two entries represent the same transaction iff
//! their duplicate key — (date, amount, category) — matches exactly. Notes
//! and timestamps are deliberately excluded from the key; when they differ
//! on a duplicate-key match, the pair is a conflict the caller must
//! resolve explicitly.

use crate::models::LedgerEntry;

const WEIGHT_DATE: f64 = 0.4;
const WEIGHT_AMOUNT: f64 = 0.4;
const WEIGHT_CATEGORY: f64 = 0.2;

/// A transient pairing of an existing entry and an imported entry judged
/// to be duplicates, with a similarity score in [0, 1]
#[derive(Debug, Clone)]
pub struct DuplicateCandidate {
    /// The matched entry already in the store
    pub existing: LedgerEntry,
    /// The incoming entry from the import
    pub imported: LedgerEntry,
    /// Position of `imported` within the imported collection
    pub imported_index: usize,
    /// Weighted similarity score
    pub similarity: f64,
}

impl DuplicateCandidate {
    /// A candidate is a conflict when the entries agree on the duplicate
    /// key but differ in detail: notes or creation time.
    pub fn is_conflict(&self) -> bool {
        self.existing.notes != self.imported.notes
            || self.existing.created_at != self.imported.created_at
    }
}

/// Exact duplicate-key equality on (date, amount, category)
pub fn is_duplicate(a: &LedgerEntry, b: &LedgerEntry) -> bool {
    a.date == b.date && a.amount == b.amount && a.category == b.category
}

/// Weighted similarity: date 0.4, amount 0.4, category 0.2
///
/// All three fields are always evaluated, so the divisor is 1.0 and a
/// full duplicate-key match scores exactly 1.0.
pub fn similarity(a: &LedgerEntry, b: &LedgerEntry) -> f64 {
    let mut score = 0.0;
    let mut total = 0.0;

    total += WEIGHT_DATE;
    if a.date == b.date {
        score += WEIGHT_DATE;
    }
    total += WEIGHT_AMOUNT;
    if a.amount == b.amount {
        score += WEIGHT_AMOUNT;
    }
    total += WEIGHT_CATEGORY;
    if a.category == b.category {
        score += WEIGHT_CATEGORY;
    }

    score / total
}

/// Pair every imported entry with the first existing entry matching its
/// duplicate key
///
/// First-match, not best-match: when several existing entries share the
/// key, only the first encountered is paired. Imported entries with no
/// match produce no candidate.
pub fn find_duplicates(
    existing: &[LedgerEntry],
    imported: &[LedgerEntry],
) -> Vec<DuplicateCandidate> {
    let mut candidates = Vec::new();
    for (index, incoming) in imported.iter().enumerate() {
        if let Some(matched) = existing.iter().find(|e| is_duplicate(e, incoming)) {
            candidates.push(DuplicateCandidate {
                existing: matched.clone(),
                imported: incoming.clone(),
                imported_index: index,
                similarity: similarity(matched, incoming),
            });
        }
    }
    candidates
}
