//! Core data models for ledgerbook
//!
//! This module contains the data structures that represent the ledger
//! domain: entries, budgets, categories, and their typed identifiers.

pub mod budget;
pub mod category;
pub mod entry;
pub mod ids;
pub mod money;

pub use budget::{Budget, BudgetType, NewBudget};
pub use category::Category;
pub use entry::{EntryPatch, LedgerEntry, NewEntry};
pub use ids::{BudgetId, CategoryId, EntryId, LogId};
pub use money::Money;
