//! Audit logging for ledgerbook
//!
//! A passive, fire-and-forget record of user-level operations.

pub mod entry;
pub mod logger;

pub use entry::OperationLog;
pub use logger::AuditLogger;
