pub mod config;
pub mod db;
pub mod export;
pub mod generator;
pub mod models;
pub mod parser;
pub mod session;
pub mod storage;
pub mod worker;

// Re-export commonly used types
pub use config::{get_config_path, AppConfig};
pub use db::{create_backend, BackendType, DatabaseConfig, TestCaseRepository};
pub use generator::{
    create_generator, GenerationError, GenerationMode, LiveGenerator, OfflineGenerator,
    TestCaseGenerator,
};
pub use models::{
    DataField, DataProfile, Requirement, StoredTestCase, TestCase, TestCaseStatus, TestCaseStore,
    TestStep,
};
pub use parser::{load_requirements_file, parse_requirements, UploadError};
pub use session::{GenerationOutcome, GenerationSession, GenerationTicket};
pub use storage::Storage;
pub use worker::{GenerationResult, GenerationWorker};
