//! Persistence for generated test cases
//!
//! "Save to database" goes through the [`TestCaseRepository`] trait so the
//! session never depends on a particular storage engine. Two backends are
//! provided: a single YAML file and SQLite.

mod sqlite_backend;
mod traits;
mod yaml_backend;

pub use sqlite_backend::SqliteBackend;
pub use traits::{BackendType, DatabaseConfig, DatabaseStats, TestCaseRepository};
pub use yaml_backend::YamlBackend;

use anyhow::Result;
use std::path::Path;

/// Infers the backend from a file extension, defaulting to YAML
pub fn infer_backend_type(path: &Path) -> BackendType {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => BackendType::Yaml,
        Some("db") | Some("sqlite") | Some("sqlite3") => BackendType::Sqlite,
        _ => BackendType::Yaml,
    }
}

/// Creates a repository backend based on the file extension or explicit type
pub fn create_backend(
    path: &Path,
    backend_type: Option<BackendType>,
) -> Result<Box<dyn TestCaseRepository>> {
    let bt = backend_type.unwrap_or_else(|| infer_backend_type(path));
    log::debug!("Opening {} test case store at {}", bt, path.display());

    match bt {
        BackendType::Yaml => Ok(Box::new(YamlBackend::new(path))),
        BackendType::Sqlite => Ok(Box::new(SqliteBackend::new(path)?)),
    }
}

/// Opens the repository described by a [`DatabaseConfig`]
pub fn open(config: &DatabaseConfig) -> Result<Box<dyn TestCaseRepository>> {
    create_backend(&config.path, Some(config.backend_type))
}
