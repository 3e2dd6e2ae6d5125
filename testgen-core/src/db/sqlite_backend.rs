//! SQLite database storage backend
//!
//! Each saved test case is one row; the full test case is kept as JSON in
//! `body` with the identifying columns pulled out for querying.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::traits::{BackendType, TestCaseRepository};
use crate::models::{StoredTestCase, TestCase, TestCaseStore};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// SQLite backend implementation
pub struct SqliteBackend {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Creates a new SQLite backend
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open SQLite database {:?}", path))?;

        // WAL for concurrent readers
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let backend = Self {
            path,
            conn: Mutex::new(conn),
        };

        backend.init_schema()?;
        Ok(backend)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("SQLite connection lock poisoned"))
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        let current_version: i32 = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        if current_version == 0 {
            conn.execute_batch(include_str!("schema.sql"))?;
        } else if current_version < SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is outdated, expected {}",
                current_version,
                SCHEMA_VERSION
            );
        }

        Ok(())
    }

    /// Serializes a test case to JSON for storage
    fn to_json(test_case: &TestCase) -> Result<String> {
        serde_json::to_string(test_case).context("Failed to serialize to JSON")
    }

    /// Deserializes a test case from JSON storage
    fn from_json(json: &str) -> Result<TestCase> {
        serde_json::from_str(json).context("Failed to deserialize from JSON")
    }

    fn insert_record(conn: &Connection, record: &StoredTestCase) -> Result<()> {
        let tc = &record.test_case;
        conn.execute(
            "INSERT OR REPLACE INTO test_cases
                (test_case_id, record_id, req_id, title, status, saved_at, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                tc.test_case_id,
                record.id.to_string(),
                tc.req_id,
                tc.title,
                tc.status.as_str(),
                record.saved_at.to_rfc3339(),
                Self::to_json(tc)?,
            ],
        )?;
        Ok(())
    }

    fn query_records(conn: &Connection, test_case_id: Option<&str>) -> Result<Vec<StoredTestCase>> {
        let sql = match test_case_id {
            Some(_) => {
                "SELECT record_id, saved_at, body FROM test_cases
                 WHERE test_case_id = ?1"
            }
            None => "SELECT record_id, saved_at, body FROM test_cases ORDER BY test_case_id",
        };
        let mut stmt = conn.prepare(sql)?;

        let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(String, String, String)> {
            let record_id: String = row.get(0)?;
            let saved_at: String = row.get(1)?;
            let body: String = row.get(2)?;
            Ok((record_id, saved_at, body))
        };
        let rows = match test_case_id {
            Some(id) => stmt.query_map(params![id], map_row)?.collect::<Vec<_>>(),
            None => stmt.query_map([], map_row)?.collect::<Vec<_>>(),
        };

        let mut records = Vec::new();
        for row_result in rows {
            let (record_id, saved_at, body) = row_result?;
            let id = Uuid::parse_str(&record_id)
                .with_context(|| format!("Invalid record id in database: {}", record_id))?;
            let saved_at = DateTime::parse_from_rfc3339(&saved_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());

            records.push(StoredTestCase {
                id,
                saved_at,
                test_case: Self::from_json(&body)?,
            });
        }

        Ok(records)
    }

    fn load_name(conn: &Connection) -> Result<String> {
        let name = conn
            .query_row("SELECT name FROM metadata WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        Ok(name.unwrap_or_default())
    }
}

impl TestCaseRepository for SqliteBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Sqlite
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<TestCaseStore> {
        let conn = self.conn()?;
        Ok(TestCaseStore {
            name: Self::load_name(&conn)?,
            test_cases: Self::query_records(&conn, None)?,
        })
    }

    fn save(&self, store: &TestCaseStore) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM test_cases", [])?;
        for record in &store.test_cases {
            Self::insert_record(&tx, record)?;
        }
        tx.execute(
            "INSERT OR REPLACE INTO metadata (id, name) VALUES (1, ?1)",
            params![store.name],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn save_test_case(&self, test_case: &TestCase) -> Result<StoredTestCase> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        // Keep the record id stable across re-saves
        let existing = Self::query_records(&tx, Some(&test_case.test_case_id))?;
        let record = match existing.into_iter().next() {
            Some(previous) => StoredTestCase {
                id: previous.id,
                saved_at: Utc::now(),
                test_case: test_case.clone(),
            },
            None => StoredTestCase::new(test_case.clone()),
        };

        Self::insert_record(&tx, &record)?;
        tx.commit()?;
        Ok(record)
    }

    fn get_test_case(&self, test_case_id: &str) -> Result<Option<StoredTestCase>> {
        let conn = self.conn()?;
        Ok(Self::query_records(&conn, Some(test_case_id))?
            .into_iter()
            .next())
    }

    fn list_test_cases(&self) -> Result<Vec<StoredTestCase>> {
        let conn = self.conn()?;
        Self::query_records(&conn, None)
    }

    fn delete_test_case(&self, test_case_id: &str) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM test_cases WHERE test_case_id = ?1",
            params![test_case_id],
        )?;
        if deleted == 0 {
            anyhow::bail!("Test case not found: {}", test_case_id)
        }
        Ok(())
    }
}
