//! Category model
//!
//! Categories are a small open vocabulary of spending labels. They ride
//! along in ledger exports and are created on first use during import.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::CategoryId;

/// A spending category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Display name, unique within a ledger
    pub name: String,

    /// Optional icon/emoji hint for the UI layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// When the category was created
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            icon: None,
            created_at: Utc::now(),
        }
    }
}
