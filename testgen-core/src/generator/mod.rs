//! Test case generation
//!
//! Generation is mode-gated: `offline` resolves test cases from a fixed
//! sample mapping, `live` stands in for an AI round-trip by waiting a fixed
//! delay and synthesizing a placeholder. Both sit behind the
//! [`TestCaseGenerator`] trait so a real backend can replace `live` without
//! touching the parser or the session.

mod live;
mod offline;
pub mod samples;

pub use live::LiveGenerator;
pub use offline::OfflineGenerator;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Requirement, TestCase};

/// Errors that can occur during generation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("No sample test case found for {0}")]
    NotFound(String),

    #[error("Failed to generate test case: {0}")]
    Failed(String),
}

/// Generation strategy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Fixed local mapping
    #[default]
    Offline,
    /// Simulated external AI call
    Live,
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMode::Offline => write!(f, "offline"),
            GenerationMode::Live => write!(f, "live"),
        }
    }
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "offline" => Ok(GenerationMode::Offline),
            "live" => Ok(GenerationMode::Live),
            other => Err(format!(
                "Invalid mode: {}. Valid values: offline, live",
                other
            )),
        }
    }
}

impl serde::Serialize for GenerationMode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for GenerationMode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A strategy that produces a test case for a requirement
pub trait TestCaseGenerator: Send + Sync {
    /// Returns the mode this generator implements
    fn mode(&self) -> GenerationMode;

    /// Produces a test case, or `NotFound` when the strategy has nothing for
    /// this requirement
    fn generate(&self, requirement: &Requirement) -> Result<TestCase, GenerationError>;
}

/// Creates the generator for a mode
pub fn create_generator(mode: GenerationMode, live_delay: Duration) -> Box<dyn TestCaseGenerator> {
    match mode {
        GenerationMode::Offline => Box::new(OfflineGenerator::new()),
        GenerationMode::Live => Box::new(LiveGenerator::new(live_delay)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(req_id: &str) -> Requirement {
        Requirement {
            req_id: req_id.to_string(),
            title: "Title".to_string(),
            text: "Text".to_string(),
        }
    }

    #[test]
    fn test_mode_parse_and_display() {
        assert_eq!("offline".parse::<GenerationMode>(), Ok(GenerationMode::Offline));
        assert_eq!(" LIVE ".parse::<GenerationMode>(), Ok(GenerationMode::Live));
        assert!("gemini".parse::<GenerationMode>().is_err());
        assert_eq!(GenerationMode::Live.to_string(), "live");
        assert_eq!(GenerationMode::default(), GenerationMode::Offline);
    }

    #[test]
    fn test_create_generator_dispatches_on_mode() {
        let offline = create_generator(GenerationMode::Offline, Duration::ZERO);
        assert_eq!(offline.mode(), GenerationMode::Offline);
        assert_eq!(
            offline.generate(&requirement("REQ-1")).unwrap().test_case_id,
            "TC-001"
        );

        let live = create_generator(GenerationMode::Live, Duration::ZERO);
        assert_eq!(live.mode(), GenerationMode::Live);
        assert_eq!(
            live.generate(&requirement("REQ-42")).unwrap().test_case_id,
            "TC-042"
        );
    }
}
