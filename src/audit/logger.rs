//! Audit logger
//!
//! Writes operation logs into the `operationLogs` collection through the
//! same record codec as every other entity. Logging is fire-and-forget: a
//! failure to write a log entry must never abort the caller's primary
//! operation, so every write error is swallowed here.

use std::sync::Arc;

use crate::crypto::SessionKey;
use crate::error::LedgerResult;
use crate::storage::record::{open, seal};
use crate::storage::KvEngine;

use super::entry::OperationLog;

/// Collection name in the key-value engine
const COLLECTION: &str = "operationLogs";

/// Handles writing operation logs to the store
pub struct AuditLogger {
    engine: Arc<dyn KvEngine>,
    session: Arc<SessionKey>,
}

impl AuditLogger {
    /// Create a logger over the given engine and session key holder
    pub fn new(engine: Arc<dyn KvEngine>, session: Arc<SessionKey>) -> Self {
        Self { engine, session }
    }

    /// Log a successful operation; never fails the caller
    pub fn log_success(&self, operation: &str, entity: &str, content: &str) {
        let log = OperationLog::success(operation, entity, content);
        let _ = self.write(&log);
    }

    /// Log a failed operation; never fails the caller
    pub fn log_failure(&self, operation: &str, entity: &str, content: &str, error: &str) {
        let log = OperationLog::failure(operation, entity, content, error);
        let _ = self.write(&log);
    }

    /// Read the most recent `limit` logs, newest first
    ///
    /// Unreadable records are skipped like any other bulk read.
    pub fn recent(&self, limit: usize) -> LedgerResult<Vec<OperationLog>> {
        let values = self.engine.get_all(COLLECTION)?;
        let mut logs: Vec<OperationLog> = values
            .into_iter()
            .filter_map(|value| open(value, &self.session).ok())
            .collect();
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs.truncate(limit);
        Ok(logs)
    }

    /// All logs, newest first (used by export)
    pub fn get_all(&self) -> LedgerResult<Vec<OperationLog>> {
        self.recent(usize::MAX)
    }

    fn write(&self, log: &OperationLog) -> LedgerResult<()> {
        let (value, _mode) = seal(log, &self.session)?;
        self.engine
            .put(COLLECTION, &log.id.as_uuid().to_string(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryEngine;

    fn logger() -> AuditLogger {
        let engine: Arc<dyn KvEngine> = Arc::new(MemoryEngine::new());
        let session = Arc::new(SessionKey::new());
        AuditLogger::new(engine, session)
    }

    #[test]
    fn test_log_and_read_back() {
        let logger = logger();
        logger.log_success("importAccountBook", "ledger", "imported 2 entries");
        logger.log_failure("importAccountBook", "ledger", "import", "1 error");

        let logs = logger.recent(10).unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().any(|l| l.success));
        assert!(logs.iter().any(|l| !l.success));
    }

    #[test]
    fn test_recent_limits_and_orders() {
        let logger = logger();
        for i in 0..5 {
            logger.log_success("createEntry", "entry", &format!("entry {}", i));
        }
        let logs = logger.recent(3).unwrap();
        assert_eq!(logs.len(), 3);
        assert!(logs[0].timestamp >= logs[1].timestamp);
    }

    #[test]
    fn test_logs_sealed_when_password_set() {
        let engine: Arc<dyn KvEngine> = Arc::new(MemoryEngine::new());
        let session = Arc::new(SessionKey::new());
        session.set("pw1");
        let logger = AuditLogger::new(Arc::clone(&engine), session);

        logger.log_success("createEntry", "entry", "created");
        let stored = engine.get_all("operationLogs").unwrap();
        assert!(stored[0].get("ciphertext").is_some());
    }
}
