//! Budget model
//!
//! A budget caps spending for a year or for one month of a year. At most one
//! budget may exist per (type, year, month) period key; the repository
//! enforces this on create and the merge engine must not violate it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{LedgerError, LedgerResult};

use super::ids::BudgetId;
use super::money::Money;

/// Whether a budget covers a month or a whole year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetType {
    Monthly,
    Yearly,
}

impl fmt::Display for BudgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

/// A spending budget for a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    /// Unique identifier
    pub id: BudgetId,

    /// Monthly or yearly
    #[serde(rename = "type")]
    pub budget_type: BudgetType,

    /// Budget year
    pub year: i32,

    /// Budget month (1-12), present iff the budget is monthly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    /// Budget cap (always positive)
    pub amount: Money,

    /// When the budget was created
    pub created_at: DateTime<Utc>,

    /// When the budget was last modified
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Create a new budget from validated input, stamping fresh timestamps
    pub fn new(input: NewBudget) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            budget_type: input.budget_type,
            year: input.year,
            month: input.month,
            amount: input.amount,
            created_at: now,
            updated_at: now,
        }
    }

    /// The (type, year, month) period key used for uniqueness
    pub fn period_key(&self) -> String {
        match self.month {
            Some(month) => format!("{}-{}-{:02}", self.budget_type, self.year, month),
            None => format!("{}-{}", self.budget_type, self.year),
        }
    }
}

/// Input for creating a new budget
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    pub budget_type: BudgetType,
    pub year: i32,
    pub month: Option<u32>,
    pub amount: Money,
}

impl NewBudget {
    /// Validate the input before creation
    pub fn validate(&self) -> LedgerResult<()> {
        if !self.amount.is_positive() {
            return Err(LedgerError::Validation(
                "amount must be greater than 0".into(),
            ));
        }
        match (self.budget_type, self.month) {
            (BudgetType::Monthly, None) => Err(LedgerError::Validation(
                "monthly budget requires a month".into(),
            )),
            (BudgetType::Yearly, Some(_)) => Err(LedgerError::Validation(
                "yearly budget must not carry a month".into(),
            )),
            (BudgetType::Monthly, Some(month)) if !(1..=12).contains(&month) => Err(
                LedgerError::Validation(format!("month out of range: {}", month)),
            ),
            _ => Ok(()),
        }
    }
}
