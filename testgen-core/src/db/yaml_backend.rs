//! YAML file storage backend
//!
//! Stores every saved test case in a single YAML file, using [`Storage`]
//! for file locking.

use anyhow::Result;
use std::path::Path;

use super::traits::{BackendType, TestCaseRepository};
use crate::models::{StoredTestCase, TestCase, TestCaseStore};
use crate::storage::Storage;

/// YAML file backend implementation
pub struct YamlBackend {
    storage: Storage,
}

impl YamlBackend {
    /// Creates a new YAML backend for the given file path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            storage: Storage::new(path),
        }
    }
}

impl TestCaseRepository for YamlBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Yaml
    }

    fn path(&self) -> &Path {
        self.storage.path()
    }

    fn load(&self) -> Result<TestCaseStore> {
        self.storage.load()
    }

    fn save(&self, store: &TestCaseStore) -> Result<()> {
        self.storage.save(store)
    }

    fn save_test_case(&self, test_case: &TestCase) -> Result<StoredTestCase> {
        let mut record = None;
        self.storage.update_atomically(|store| {
            record = Some(store.upsert(test_case.clone()));
        })?;
        record.ok_or_else(|| anyhow::anyhow!("Failed to save {}", test_case.test_case_id))
    }
}
