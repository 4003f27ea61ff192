//! Category repository
//!
//! Categories are matched by name. Import creates missing categories on
//! the fly, so create-if-absent is the primary write path.

use std::sync::Arc;

use crate::crypto::SessionKey;
use crate::error::LedgerResult;
use crate::models::Category;

use super::kv::KvEngine;
use super::record::{open, seal, StorageMode};

/// Collection name in the key-value engine
const COLLECTION: &str = "categories";

/// Repository for categories
pub struct CategoryRepository {
    engine: Arc<dyn KvEngine>,
    session: Arc<SessionKey>,
}

impl CategoryRepository {
    /// Create a repository over the given engine and session key holder
    pub fn new(engine: Arc<dyn KvEngine>, session: Arc<SessionKey>) -> Self {
        Self { engine, session }
    }

    /// Create a category unless one with the same name already exists
    ///
    /// Returns the new category, or `None` when the name was taken.
    pub fn create_if_absent(
        &self,
        name: &str,
    ) -> LedgerResult<Option<(Category, StorageMode)>> {
        if self.get_all()?.iter().any(|c| c.name == name) {
            return Ok(None);
        }

        let category = Category::new(name);
        let (value, mode) = seal(&category, &self.session)?;
        self.engine
            .put(COLLECTION, &category.id.as_uuid().to_string(), value)?;
        Ok(Some((category, mode)))
    }

    /// Get all categories, sorted by name
    pub fn get_all(&self) -> LedgerResult<Vec<Category>> {
        let values = self.engine.get_all(COLLECTION)?;
        let mut categories: Vec<Category> = values
            .into_iter()
            .filter_map(|value| open(value, &self.session).ok())
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv::MemoryEngine;

    fn repo() -> CategoryRepository {
        let engine: Arc<dyn KvEngine> = Arc::new(MemoryEngine::new());
        let session = Arc::new(SessionKey::new());
        session.set("pw1");
        CategoryRepository::new(engine, session)
    }

    #[test]
    fn test_create_if_absent() {
        let repo = repo();
        assert!(repo.create_if_absent("food").unwrap().is_some());
        assert!(repo.create_if_absent("food").unwrap().is_none());
        assert_eq!(repo.get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_get_all_sorted_by_name() {
        let repo = repo();
        repo.create_if_absent("transport").unwrap();
        repo.create_if_absent("food").unwrap();

        let names: Vec<String> = repo.get_all().unwrap().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["food", "transport"]);
    }
}
