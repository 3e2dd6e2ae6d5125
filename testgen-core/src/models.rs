use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix used for requirement identifiers assigned by the parser
pub const REQ_ID_PREFIX: &str = "REQ-";

/// Prefix used for test case identifiers
pub const TEST_CASE_ID_PREFIX: &str = "TC-";

/// A single requirement line parsed from an uploaded document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Requirement {
    /// Sequential identifier, e.g. "REQ-3"
    pub req_id: String,
    /// Short form of the text used in listings
    pub title: String,
    /// Full trimmed line
    pub text: String,
}

impl Requirement {
    /// Returns the numeric part of the identifier ("REQ-7" -> "7")
    pub fn number_suffix(&self) -> Option<&str> {
        self.req_id
            .split_once('-')
            .map(|(_, n)| n)
            .filter(|n| !n.is_empty())
    }
}

/// Review status of a test case
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TestCaseStatus {
    #[default]
    PendingReview,
    Approved,
    Rejected,
}

impl TestCaseStatus {
    /// The serialized form, e.g. "pending_review"
    pub fn as_str(&self) -> &'static str {
        match self {
            TestCaseStatus::PendingReview => "pending_review",
            TestCaseStatus::Approved => "approved",
            TestCaseStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for TestCaseStatus {
    type Err = String;

    /// Accepts the serialized form, e.g. "pending_review"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending_review" => Ok(TestCaseStatus::PendingReview),
            "approved" => Ok(TestCaseStatus::Approved),
            "rejected" => Ok(TestCaseStatus::Rejected),
            other => Err(format!(
                "Invalid status: {}. Valid values: pending_review, approved, rejected",
                other
            )),
        }
    }
}

impl fmt::Display for TestCaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().replace('_', " ").to_uppercase())
    }
}

/// One ordered step of a test case
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestStep {
    pub step: u32,
    pub action: String,
    pub expected: String,
}

impl TestStep {
    pub fn new(step: u32, action: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            step,
            action: action.into(),
            expected: expected.into(),
        }
    }
}

/// A field of the synthetic data profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

impl DataField {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
        }
    }
}

/// Describes the synthetic data needed to exercise a test case
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataProfile {
    pub fields: Vec<DataField>,
    pub rows: u32,
    pub note: String,
}

/// A generated test case for one requirement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TestCase {
    pub test_case_id: String,
    pub req_id: String,
    pub title: String,
    pub test_steps: Vec<TestStep>,
    pub expected_results: String,
    pub data_profile: DataProfile,
    #[serde(default)]
    pub status: TestCaseStatus,
}

/// A test case as persisted by a repository backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredTestCase {
    /// Unique record identifier
    pub id: Uuid,
    /// When the record was last written
    pub saved_at: DateTime<Utc>,
    pub test_case: TestCase,
}

impl StoredTestCase {
    /// Wraps a test case in a fresh record stamped with the current time
    pub fn new(test_case: TestCase) -> Self {
        Self {
            id: Uuid::new_v4(),
            saved_at: Utc::now(),
            test_case,
        }
    }

    pub fn test_case_id(&self) -> &str {
        &self.test_case.test_case_id
    }
}

/// Everything a repository backend holds
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TestCaseStore {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub test_cases: Vec<StoredTestCase>,
}

impl TestCaseStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a saved record by its test case ID (e.g., "TC-001")
    pub fn get_by_test_case_id(&self, test_case_id: &str) -> Option<&StoredTestCase> {
        self.test_cases
            .iter()
            .find(|r| r.test_case_id() == test_case_id)
    }

    /// Inserts a record, replacing any earlier record with the same test case ID.
    /// Returns the stored record.
    pub fn upsert(&mut self, test_case: TestCase) -> StoredTestCase {
        match self
            .test_cases
            .iter_mut()
            .find(|r| r.test_case_id() == test_case.test_case_id)
        {
            Some(existing) => {
                existing.test_case = test_case;
                existing.saved_at = Utc::now();
                existing.clone()
            }
            None => {
                let record = StoredTestCase::new(test_case);
                self.test_cases.push(record.clone());
                record
            }
        }
    }

    /// Removes a record by test case ID. Returns true if something was removed.
    pub fn remove(&mut self, test_case_id: &str) -> bool {
        let original_len = self.test_cases.len();
        self.test_cases.retain(|r| r.test_case_id() != test_case_id);
        self.test_cases.len() != original_len
    }
}
