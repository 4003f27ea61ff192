//! Ledger entry model
//!
//! A ledger entry is one recorded transaction: an amount spent on a date
//! against a category, with optional free-form notes. Timestamps are
//! system-managed; `date` is the transaction date, not the creation date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

use super::ids::EntryId;
use super::money::Money;

/// A single ledger entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Unique identifier, immutable after creation
    pub id: EntryId,

    /// Amount spent (always positive)
    pub amount: Money,

    /// Transaction date
    pub date: NaiveDate,

    /// Category code (e.g. "food", "餐饮")
    pub category: String,

    /// Free-form notes
    #[serde(default)]
    pub notes: String,

    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// When the entry was last modified
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Create a new entry from validated input, stamping fresh timestamps
    pub fn new(input: NewEntry) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            amount: input.amount,
            date: input.date,
            category: input.category,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, bumping `updated_at` and preserving
    /// `id`/`created_at`
    pub fn apply(&mut self, patch: EntryPatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        self.updated_at = Utc::now();
    }
}

/// Input for creating a new ledger entry
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub amount: Money,
    pub date: NaiveDate,
    pub category: String,
    pub notes: String,
}

impl NewEntry {
    /// Validate the input before creation
    pub fn validate(&self) -> LedgerResult<()> {
        if !self.amount.is_positive() {
            return Err(LedgerError::Validation(
                "amount must be greater than 0".into(),
            ));
        }
        if self.category.trim().is_empty() {
            return Err(LedgerError::Validation("category must not be empty".into()));
        }
        Ok(())
    }
}

/// Partial update for a ledger entry
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl EntryPatch {
    /// Validate the patch fields that are present
    pub fn validate(&self) -> LedgerResult<()> {
        if let Some(amount) = self.amount {
            if !amount.is_positive() {
                return Err(LedgerError::Validation(
                    "amount must be greater than 0".into(),
                ));
            }
        }
        if let Some(category) = &self.category {
            if category.trim().is_empty() {
                return Err(LedgerError::Validation("category must not be empty".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> NewEntry {
        NewEntry {
            amount: Money::from_cents(10050),
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            category: "food".into(),
            notes: "lunch".into(),
        }
    }

    #[test]
    fn test_new_entry_stamps_timestamps() {
        let entry = LedgerEntry::new(input());
        assert_eq!(entry.created_at, entry.updated_at);
        assert_eq!(entry.amount, Money::from_cents(10050));
    }

    #[test]
    fn test_validation_rejects_nonpositive_amount() {
        let mut bad = input();
        bad.amount = Money::zero();
        let err = bad.validate().unwrap_err();
        assert!(err.to_string().contains("amount must be greater than 0"));
    }

    #[test]
    fn test_validation_rejects_empty_category() {
        let mut bad = input();
        bad.category = "  ".into();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_apply_patch_preserves_created_at() {
        let mut entry = LedgerEntry::new(input());
        let created = entry.created_at;
        entry.apply(EntryPatch {
            notes: Some("dinner".into()),
            ..Default::default()
        });
        assert_eq!(entry.created_at, created);
        assert_eq!(entry.notes, "dinner");
        assert!(entry.updated_at >= created);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let entry = LedgerEntry::new(input());
        let value = serde_json::to_value(&entry).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn test_serde_roundtrip() {
        let entry = LedgerEntry::new(input());
        let json = serde_json::to_string(&entry).unwrap();
        let back: LedgerEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
