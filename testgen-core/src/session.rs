//! Generation session state
//!
//! Holds the uploaded requirements, the single "current" test case slot and
//! the registry of requirements that have been generated at least once.
//! The session is owned by the controller and handed to renderers by
//! reference.
//!
//! Every generation request is issued a ticket with a sequence number. Only
//! the most recently issued ticket may change state; completions for older
//! tickets are reported as [`GenerationOutcome::Stale`] and dropped.

use std::collections::HashSet;
use std::path::Path;

use crate::generator::{GenerationError, GenerationMode, TestCaseGenerator};
use crate::models::{Requirement, TestCase};
use crate::parser::{self, UploadError};

/// Handle for one in-flight generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationTicket {
    pub seq: u64,
    pub requirement: Requirement,
}

impl GenerationTicket {
    pub fn req_id(&self) -> &str {
        &self.requirement.req_id
    }
}

/// Result of applying a finished generation to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The current slot now holds this test case
    Generated { req_id: String, test_case_id: String },
    /// Offline mapping had no entry; slot stays empty
    NotFound { req_id: String },
    /// Generation failed; slot stays empty
    Failed { req_id: String, reason: String },
    /// A newer request or upload superseded this one; nothing changed
    Stale { req_id: String },
}

/// Session state for one user
#[derive(Debug, Default)]
pub struct GenerationSession {
    mode: GenerationMode,
    requirements: Vec<Requirement>,
    current_test_case: Option<TestCase>,
    generated: HashSet<String>,
    generating_for: Option<String>,
    latest_seq: u64,
}

impl GenerationSession {
    pub fn new(mode: GenerationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GenerationMode) {
        self.mode = mode;
    }

    /// Loads a requirements file into the session.
    ///
    /// On error the session is left exactly as it was.
    pub fn upload_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, UploadError> {
        let requirements = parser::load_requirements_file(path)?;
        let count = requirements.len();
        self.replace_requirements(requirements);
        Ok(count)
    }

    /// Replaces the requirement list and resets all generation state
    pub fn replace_requirements(&mut self, requirements: Vec<Requirement>) {
        self.requirements = requirements;
        self.generated.clear();
        self.current_test_case = None;
        self.generating_for = None;
        // Anything still in flight belongs to the old document
        self.latest_seq += 1;
        log::info!(
            "Session loaded {} requirements",
            self.requirements.len()
        );
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn find_requirement(&self, req_id: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.req_id == req_id)
    }

    pub fn current_test_case(&self) -> Option<&TestCase> {
        self.current_test_case.as_ref()
    }

    /// The requirement currently being generated, if any
    pub fn generating_for(&self) -> Option<&str> {
        self.generating_for.as_deref()
    }

    pub fn is_generating(&self, req_id: &str) -> bool {
        self.generating_for.as_deref() == Some(req_id)
    }

    pub fn has_generated(&self, req_id: &str) -> bool {
        self.generated.contains(req_id)
    }

    pub fn generated_count(&self) -> usize {
        self.generated.len()
    }

    /// Starts a generation request for a requirement in the session.
    ///
    /// Clears the current slot and supersedes any earlier request.
    /// Returns `None` if the requirement is not part of the session.
    pub fn begin_generation(&mut self, req_id: &str) -> Option<GenerationTicket> {
        let requirement = self.find_requirement(req_id)?.clone();

        self.latest_seq += 1;
        self.generating_for = Some(requirement.req_id.clone());
        self.current_test_case = None;

        log::debug!(
            "Generation #{} started for {} ({} mode)",
            self.latest_seq,
            requirement.req_id,
            self.mode
        );

        Some(GenerationTicket {
            seq: self.latest_seq,
            requirement,
        })
    }

    /// Applies a finished generation to the session
    pub fn complete_generation(
        &mut self,
        ticket: &GenerationTicket,
        result: Result<TestCase, GenerationError>,
    ) -> GenerationOutcome {
        let req_id = ticket.req_id().to_string();

        if ticket.seq != self.latest_seq {
            log::warn!(
                "Discarding stale generation #{} for {} (latest is #{})",
                ticket.seq,
                req_id,
                self.latest_seq
            );
            return GenerationOutcome::Stale { req_id };
        }

        self.generating_for = None;

        match result {
            Ok(test_case) => {
                let test_case_id = test_case.test_case_id.clone();
                self.generated.insert(req_id.clone());
                self.current_test_case = Some(test_case);
                GenerationOutcome::Generated {
                    req_id,
                    test_case_id,
                }
            }
            Err(GenerationError::NotFound(_)) => {
                self.current_test_case = None;
                GenerationOutcome::NotFound { req_id }
            }
            Err(GenerationError::Failed(reason)) => {
                log::warn!("Generation failed for {}: {}", req_id, reason);
                self.current_test_case = None;
                GenerationOutcome::Failed { req_id, reason }
            }
        }
    }

    /// Runs a generation to completion on the calling thread
    pub fn generate_with(
        &mut self,
        req_id: &str,
        generator: &dyn TestCaseGenerator,
    ) -> Option<GenerationOutcome> {
        let ticket = self.begin_generation(req_id)?;
        let result = generator.generate(&ticket.requirement);
        Some(self.complete_generation(&ticket, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{LiveGenerator, OfflineGenerator};
    use crate::parser::parse_requirements;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::Builder;

    fn session_with(lines: &str) -> GenerationSession {
        let mut session = GenerationSession::new(GenerationMode::Offline);
        session.replace_requirements(parse_requirements(lines));
        session
    }

    #[test]
    fn test_offline_hit_sets_slot_and_registry() {
        let mut session = session_with("a\nb\nc");
        let generator = OfflineGenerator::new();

        let outcome = session.generate_with("REQ-2", &generator).unwrap();
        assert_eq!(
            outcome,
            GenerationOutcome::Generated {
                req_id: "REQ-2".into(),
                test_case_id: "TC-002".into()
            }
        );
        assert!(session.has_generated("REQ-2"));
        assert!(!session.has_generated("REQ-1"));
        assert_eq!(session.current_test_case().unwrap().test_case_id, "TC-002");
        assert_eq!(session.generating_for(), None);
    }

    #[test]
    fn test_offline_miss_leaves_slot_unset() {
        let mut session = session_with("1\n2\n3\n4\n5\n6");
        let generator = OfflineGenerator::new();

        session.generate_with("REQ-1", &generator).unwrap();
        assert!(session.current_test_case().is_some());

        let outcome = session.generate_with("REQ-6", &generator).unwrap();
        assert_eq!(outcome, GenerationOutcome::NotFound { req_id: "REQ-6".into() });
        assert!(session.current_test_case().is_none());
        assert!(!session.has_generated("REQ-6"));
        assert!(session.has_generated("REQ-1"));
    }

    #[test]
    fn test_unknown_requirement_is_ignored() {
        let mut session = session_with("only one");
        let generator = OfflineGenerator::new();
        assert!(session.generate_with("REQ-9", &generator).is_none());
        assert_eq!(session.generating_for(), None);
    }

    #[test]
    fn test_is_generating_while_in_flight() {
        let mut session = session_with("a\nb");
        let ticket = session.begin_generation("REQ-1").unwrap();

        assert!(session.is_generating("REQ-1"));
        assert!(!session.is_generating("REQ-2"));

        let tc = LiveGenerator::new(Duration::ZERO)
            .generate(&ticket.requirement)
            .unwrap();
        session.complete_generation(&ticket, Ok(tc));
        assert!(!session.is_generating("REQ-1"));
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut session = session_with("a\nb");
        let live = LiveGenerator::new(Duration::ZERO);

        let first = session.begin_generation("REQ-1").unwrap();
        let second = session.begin_generation("REQ-2").unwrap();

        // Second request resolves first, then the older one arrives late
        let second_result = live.generate(&second.requirement);
        let outcome = session.complete_generation(&second, second_result);
        assert!(matches!(outcome, GenerationOutcome::Generated { .. }));

        let first_result = live.generate(&first.requirement);
        let outcome = session.complete_generation(&first, first_result);
        assert_eq!(outcome, GenerationOutcome::Stale { req_id: "REQ-1".into() });

        assert_eq!(session.current_test_case().unwrap().req_id, "REQ-2");
        assert!(!session.has_generated("REQ-1"));
    }

    #[test]
    fn test_failure_resets_to_idle() {
        let mut session = session_with("a");
        let ticket = session.begin_generation("REQ-1").unwrap();

        let outcome = session.complete_generation(
            &ticket,
            Err(GenerationError::Failed("boom".into())),
        );
        assert_eq!(
            outcome,
            GenerationOutcome::Failed {
                req_id: "REQ-1".into(),
                reason: "boom".into()
            }
        );
        assert_eq!(session.generating_for(), None);
        assert!(session.current_test_case().is_none());
        assert_eq!(session.generated_count(), 0);
    }

    #[test]
    fn test_reupload_clears_registry_and_slot() {
        let mut session = session_with("a\nb");
        let generator = OfflineGenerator::new();
        session.generate_with("REQ-1", &generator).unwrap();
        assert!(session.has_generated("REQ-1"));

        let mut file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "new one\nnew two\nnew three").unwrap();

        assert_eq!(session.upload_file(file.path()).unwrap(), 3);
        assert!(!session.has_generated("REQ-1"));
        assert!(session.current_test_case().is_none());
        assert_eq!(session.requirements().len(), 3);
    }

    #[test]
    fn test_upload_invalidates_in_flight_requests() {
        let mut session = session_with("a");
        let ticket = session.begin_generation("REQ-1").unwrap();

        session.replace_requirements(parse_requirements("x\ny"));

        let result = OfflineGenerator::new().generate(&ticket.requirement);
        let outcome = session.complete_generation(&ticket, result);
        assert!(matches!(outcome, GenerationOutcome::Stale { .. }));
        assert!(session.current_test_case().is_none());
    }

    #[test]
    fn test_bad_upload_changes_nothing() {
        let mut session = session_with("keep me\nand me");
        let generator = OfflineGenerator::new();
        session.generate_with("REQ-1", &generator).unwrap();

        let mut file = Builder::new().suffix(".docx").tempfile().unwrap();
        writeln!(file, "ignored").unwrap();

        let err = session.upload_file(file.path()).unwrap_err();
        assert!(matches!(err, UploadError::FileFormat(_)));
        assert_eq!(session.requirements().len(), 2);
        assert_eq!(session.requirements()[0].text, "keep me");
        assert!(session.has_generated("REQ-1"));
        assert!(session.current_test_case().is_some());
    }
}
