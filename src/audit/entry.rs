//! Operation log entry
//!
//! One record per completed (or failed) user-level operation. The log is a
//! passive audit trail: it records outcomes, it never participates in them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::LogId;
use crate::storage::record::Persistable;

/// A single operation log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLog {
    /// Unique identifier
    pub id: LogId,

    /// Operation name, e.g. "importAccountBook"
    pub operation: String,

    /// What kind of thing was operated on, e.g. "ledger", "entry"
    pub entity: String,

    /// Human-readable summary of what happened
    pub content: String,

    /// Whether the operation succeeded
    pub success: bool,

    /// Joined error descriptions for failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the operation completed
    pub timestamp: DateTime<Utc>,
}

impl OperationLog {
    /// Record a successful operation
    pub fn success(
        operation: impl Into<String>,
        entity: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: LogId::new(),
            operation: operation.into(),
            entity: entity.into(),
            content: content.into(),
            success: true,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Record a failed operation
    pub fn failure(
        operation: impl Into<String>,
        entity: impl Into<String>,
        content: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: LogId::new(),
            operation: operation.into(),
            entity: entity.into(),
            content: content.into(),
            success: false,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }
}

impl Persistable for OperationLog {
    fn record_id(&self) -> String {
        self.id.as_uuid().to_string()
    }
    fn record_created_at(&self) -> chrono::DateTime<Utc> {
        self.timestamp
    }
    fn record_updated_at(&self) -> chrono::DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_entry() {
        let log = OperationLog::success("importAccountBook", "ledger", "imported 3 entries");
        assert!(log.success);
        assert!(log.error.is_none());
    }

    #[test]
    fn test_failure_entry_serializes_error() {
        let log = OperationLog::failure("importAccountBook", "ledger", "import", "bad envelope");
        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value.get("success").unwrap(), false);
        assert_eq!(value.get("error").unwrap(), "bad envelope");
    }
}
