//! Test case repository traits
//!
//! This module defines the core trait that all storage backends must implement.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::models::{StoredTestCase, TestCase, TestCaseStore};

/// Types of database backends available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// YAML file storage (single file)
    Yaml,
    /// SQLite database storage
    Sqlite,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Yaml => write!(f, "YAML"),
            BackendType::Sqlite => write!(f, "SQLite"),
        }
    }
}

impl std::str::FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(BackendType::Yaml),
            "sqlite" | "db" => Ok(BackendType::Sqlite),
            other => Err(format!(
                "Invalid backend: {}. Valid values: yaml, sqlite",
                other
            )),
        }
    }
}

/// Configuration for database backends
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the database file
    pub path: PathBuf,
    /// Backend type
    pub backend_type: BackendType,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("test_cases.yaml"),
            backend_type: BackendType::Yaml,
        }
    }
}

/// Where "save to database" sends the current test case.
///
/// `load()` and `save()` work with the whole [`TestCaseStore`]; the record
/// operations default to load-modify-save and backends may override them
/// with something cheaper.
pub trait TestCaseRepository: Send + Sync {
    /// Returns the backend type
    fn backend_type(&self) -> BackendType;

    /// Returns the path to the database file
    fn path(&self) -> &Path;

    /// Loads the entire store
    fn load(&self) -> Result<TestCaseStore>;

    /// Replaces the entire store
    fn save(&self, store: &TestCaseStore) -> Result<()>;

    // =========================================================================
    // Test case operations
    // =========================================================================

    /// Saves a test case, replacing any earlier record with the same test case ID
    fn save_test_case(&self, test_case: &TestCase) -> Result<StoredTestCase> {
        let mut store = self.load()?;
        let record = store.upsert(test_case.clone());
        self.save(&store)?;
        Ok(record)
    }

    /// Gets a saved record by test case ID (e.g., "TC-001")
    fn get_test_case(&self, test_case_id: &str) -> Result<Option<StoredTestCase>> {
        let store = self.load()?;
        Ok(store.get_by_test_case_id(test_case_id).cloned())
    }

    /// Lists all saved records, ordered by test case ID
    fn list_test_cases(&self) -> Result<Vec<StoredTestCase>> {
        let mut records = self.load()?.test_cases;
        records.sort_by(|a, b| a.test_case_id().cmp(b.test_case_id()));
        Ok(records)
    }

    /// Deletes a saved record by test case ID
    fn delete_test_case(&self, test_case_id: &str) -> Result<()> {
        let mut store = self.load()?;
        if !store.remove(test_case_id) {
            anyhow::bail!("Test case not found: {}", test_case_id)
        }
        self.save(&store)
    }

    // =========================================================================
    // Utility Operations
    // =========================================================================

    /// Returns true if the database file exists
    fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Creates the database with empty data if it doesn't exist
    fn create_if_not_exists(&self) -> Result<()> {
        if !self.exists() {
            self.save(&TestCaseStore::new())?;
        }
        Ok(())
    }

    /// Returns statistics about the database
    fn stats(&self) -> Result<DatabaseStats> {
        let store = self.load()?;
        Ok(DatabaseStats {
            test_case_count: store.test_cases.len(),
            backend_type: self.backend_type(),
        })
    }
}

/// Statistics about a database
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub test_case_count: usize,
    pub backend_type: BackendType,
}
