//! Export envelope: the JSON container for a whole-ledger export
//!
//! The envelope is produced fresh on every export and consumed once per
//! import; it is never persisted as-is. Collections are held as loose
//! JSON values so envelopes written by older or differently-configured
//! versions of the program can still be validated with readable errors
//! instead of opaque deserialization failures.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{BudgetType, EntryId, LedgerEntry, Money, NewBudget};

/// Version written by this program's exports
pub const EXPORT_VERSION: &str = "1.0.0";

/// A whole-ledger export/import envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEnvelope {
    /// Semantic version of the export schema
    #[serde(default)]
    pub version: String,

    /// When the export was produced
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,

    /// The exported collections
    #[serde(default)]
    pub data: ExportData,
}

/// The collections carried in an envelope; order is irrelevant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    /// Ledger entries
    #[serde(default)]
    pub accounts: Vec<Value>,

    /// Categories
    #[serde(default)]
    pub categories: Vec<Value>,

    /// Budgets
    #[serde(default)]
    pub budgets: Vec<Value>,

    /// Operation logs (carried along, never merged)
    #[serde(default)]
    pub operation_logs: Vec<Value>,
}

impl ExportEnvelope {
    /// Parse an envelope from JSON text
    pub fn from_json(json: &str) -> LedgerResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| LedgerError::Import(format!("envelope is not valid JSON: {}", e)))
    }

    /// Serialize the envelope to pretty JSON text
    pub fn to_json(&self) -> LedgerResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Export(format!("failed to serialize envelope: {}", e)))
    }

    /// Structural validation, failing fast on the first violation
    ///
    /// The envelope must declare a version and export time; every entry
    /// must carry id/date/amount/category; every budget must carry
    /// id/type/amount/year.
    pub fn validate(&self) -> LedgerResult<()> {
        if self.version.trim().is_empty() {
            return Err(LedgerError::Import("envelope is missing a version".into()));
        }
        if self.exported_at.is_none() {
            return Err(LedgerError::Import(
                "envelope is missing an export timestamp".into(),
            ));
        }

        for (index, entry) in self.data.accounts.iter().enumerate() {
            for field in ["id", "date", "amount", "category"] {
                if entry.get(field).is_none() {
                    return Err(LedgerError::Import(format!(
                        "entry at index {} is missing required field '{}'",
                        index, field
                    )));
                }
            }
        }

        for (index, budget) in self.data.budgets.iter().enumerate() {
            for field in ["id", "type", "amount", "year"] {
                if budget.get(field).is_none() {
                    return Err(LedgerError::Import(format!(
                        "budget at index {} is missing required field '{}'",
                        index, field
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Tolerant wire shape for an imported ledger entry
///
/// Foreign envelopes may omit notes and system timestamps; those default
/// rather than failing the whole record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEntry {
    #[serde(default)]
    id: Option<EntryId>,
    amount: Money,
    date: NaiveDate,
    category: String,
    #[serde(default)]
    notes: String,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    updated_at: DateTime<Utc>,
}

/// Convert one envelope entry value into a typed entry
pub fn entry_from_value(value: &Value) -> Result<LedgerEntry, String> {
    let wire: WireEntry =
        serde_json::from_value(value.clone()).map_err(|e| format!("unreadable entry: {}", e))?;
    Ok(LedgerEntry {
        id: wire.id.unwrap_or_default(),
        amount: wire.amount,
        date: wire.date,
        category: wire.category,
        notes: wire.notes,
        created_at: wire.created_at,
        updated_at: wire.updated_at,
    })
}

/// Tolerant wire shape for an imported budget
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireBudget {
    #[serde(rename = "type")]
    budget_type: BudgetType,
    year: i32,
    #[serde(default)]
    month: Option<u32>,
    amount: Money,
}

/// Convert one envelope budget value into creation input
pub fn budget_from_value(value: &Value) -> Result<NewBudget, String> {
    let wire: WireBudget =
        serde_json::from_value(value.clone()).map_err(|e| format!("unreadable budget: {}", e))?;
    Ok(NewBudget {
        budget_type: wire.budget_type,
        year: wire.year,
        month: wire.month,
        amount: wire.amount,
    })
}

/// Extract a category name from an envelope category value
pub fn category_name_from_value(value: &Value) -> Result<String, String> {
    value
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| "category is missing a name".to_string())
}
