//! Storage layer for ledgerbook
//!
//! Repositories translate typed records to and from sealed storage values
//! and run CRUD against the key-value engine seam. The session key holder
//! is injected once at construction and shared by every repository.

pub mod budgets;
pub mod categories;
pub mod entries;
pub mod kv;
pub mod record;

pub use budgets::BudgetRepository;
pub use categories::CategoryRepository;
pub use entries::EntryRepository;
pub use kv::{FileEngine, KvEngine, MemoryEngine};
pub use record::{EncryptedEnvelope, StorageMode};

use std::sync::Arc;

use crate::crypto::SessionKey;

/// Main storage coordinator providing access to all repositories
pub struct Storage {
    engine: Arc<dyn KvEngine>,
    session: Arc<SessionKey>,
    pub entries: EntryRepository,
    pub budgets: BudgetRepository,
    pub categories: CategoryRepository,
}

impl Storage {
    /// Create a Storage instance over an engine and a session key holder
    pub fn new(engine: Arc<dyn KvEngine>, session: Arc<SessionKey>) -> Self {
        Self {
            entries: EntryRepository::new(Arc::clone(&engine), Arc::clone(&session)),
            budgets: BudgetRepository::new(Arc::clone(&engine), Arc::clone(&session)),
            categories: CategoryRepository::new(Arc::clone(&engine), Arc::clone(&session)),
            engine,
            session,
        }
    }

    /// The underlying key-value engine
    pub fn engine(&self) -> &Arc<dyn KvEngine> {
        &self.engine
    }

    /// The session key holder
    pub fn session(&self) -> &Arc<SessionKey> {
        &self.session
    }

    /// Set the session encryption password
    pub fn set_encryption_password(&self, password: impl Into<String>) {
        self.session.set(password);
    }

    /// Whether a session encryption password is set
    pub fn has_encryption_password(&self) -> bool {
        self.session.is_set()
    }

    /// Clear the session encryption password
    pub fn clear_encryption_password(&self) {
        self.session.clear();
    }
}
