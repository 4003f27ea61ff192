//! Budget repository
//!
//! Same sealing rules as entries. At most one budget may exist per
//! (type, year, month) period key; create scans the existing set and
//! refuses a second budget for the same period.

use std::sync::Arc;

use crate::crypto::SessionKey;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Budget, BudgetId, NewBudget};

use super::kv::KvEngine;
use super::record::{open, seal, StorageMode};

/// Collection name in the key-value engine
const COLLECTION: &str = "budgets";

/// Repository for budgets
pub struct BudgetRepository {
    engine: Arc<dyn KvEngine>,
    session: Arc<SessionKey>,
}

impl BudgetRepository {
    /// Create a repository over the given engine and session key holder
    pub fn new(engine: Arc<dyn KvEngine>, session: Arc<SessionKey>) -> Self {
        Self { engine, session }
    }

    /// Create a new budget
    ///
    /// Fails with a `Duplicate` error if a budget already exists for the
    /// same period; existing budgets are never overwritten.
    pub fn create(&self, input: NewBudget) -> LedgerResult<(Budget, StorageMode)> {
        input.validate()?;
        let budget = Budget::new(input);

        let key = budget.period_key();
        if self.get_all()?.iter().any(|b| b.period_key() == key) {
            return Err(LedgerError::budget_exists(key));
        }

        let (value, mode) = seal(&budget, &self.session)?;
        self.engine
            .put(COLLECTION, &budget.id.as_uuid().to_string(), value)?;
        Ok((budget, mode))
    }

    /// Get one budget by id
    pub fn get(&self, id: BudgetId) -> LedgerResult<Option<Budget>> {
        match self.engine.get(COLLECTION, &id.as_uuid().to_string())? {
            Some(value) => Ok(Some(open(value, &self.session)?)),
            None => Ok(None),
        }
    }

    /// Get all budgets, most recent period first
    ///
    /// Undecryptable records are skipped, matching the entry repository.
    pub fn get_all(&self) -> LedgerResult<Vec<Budget>> {
        let values = self.engine.get_all(COLLECTION)?;
        let mut budgets: Vec<Budget> = values
            .into_iter()
            .filter_map(|value| open(value, &self.session).ok())
            .collect();
        budgets.sort_by(|a, b| {
            b.year
                .cmp(&a.year)
                .then(b.month.unwrap_or(0).cmp(&a.month.unwrap_or(0)))
        });
        Ok(budgets)
    }

    /// Delete a budget; deleting a missing id is not an error
    pub fn delete(&self, id: BudgetId) -> LedgerResult<()> {
        self.engine.delete(COLLECTION, &id.as_uuid().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetType, Money};
    use crate::storage::kv::MemoryEngine;

    fn repo() -> BudgetRepository {
        let engine: Arc<dyn KvEngine> = Arc::new(MemoryEngine::new());
        let session = Arc::new(SessionKey::new());
        session.set("pw1");
        BudgetRepository::new(engine, session)
    }

    fn monthly(year: i32, month: u32, cents: i64) -> NewBudget {
        NewBudget {
            budget_type: BudgetType::Monthly,
            year,
            month: Some(month),
            amount: Money::from_cents(cents),
        }
    }

    #[test]
    fn test_create_and_get() {
        let repo = repo();
        let (created, mode) = repo.create(monthly(2026, 1, 50000)).unwrap();
        assert_eq!(mode, StorageMode::Encrypted);
        assert_eq!(repo.get(created.id).unwrap().unwrap(), created);
    }

    #[test]
    fn test_period_uniqueness() {
        let repo = repo();
        repo.create(monthly(2026, 1, 50000)).unwrap();

        let err = repo.create(monthly(2026, 1, 60000)).unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));

        // A different month is fine
        repo.create(monthly(2026, 2, 60000)).unwrap();
        assert_eq!(repo.get_all().unwrap().len(), 2);
    }

    #[test]
    fn test_yearly_and_monthly_same_year_coexist() {
        let repo = repo();
        repo.create(monthly(2026, 1, 50000)).unwrap();
        repo.create(NewBudget {
            budget_type: BudgetType::Yearly,
            year: 2026,
            month: None,
            amount: Money::from_cents(500000),
        })
        .unwrap();
        assert_eq!(repo.get_all().unwrap().len(), 2);
    }

    #[test]
    fn test_get_all_sorted_recent_first() {
        let repo = repo();
        repo.create(monthly(2025, 12, 1)).unwrap();
        repo.create(monthly(2026, 2, 1)).unwrap();
        repo.create(monthly(2026, 1, 1)).unwrap();

        let keys: Vec<String> = repo
            .get_all()
            .unwrap()
            .iter()
            .map(|b| b.period_key())
            .collect();
        assert_eq!(
            keys,
            vec!["monthly-2026-02", "monthly-2026-01", "monthly-2025-12"]
        );
    }

    #[test]
    fn test_delete_idempotent() {
        let repo = repo();
        let (created, _) = repo.create(monthly(2026, 1, 1)).unwrap();
        repo.delete(created.id).unwrap();
        repo.delete(created.id).unwrap();
        assert!(repo.get(created.id).unwrap().is_none());
    }
}
