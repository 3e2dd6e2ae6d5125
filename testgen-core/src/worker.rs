//! Background generation worker
//!
//! Runs generation requests off the controller thread so a slow (live)
//! generator never blocks input handling. Each request runs on its own
//! thread and cannot be cancelled; overlapping requests finish
//! independently and the session decides which result is stale.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::generator::{GenerationError, TestCaseGenerator};
use crate::models::TestCase;
use crate::session::GenerationTicket;

/// A finished generation, ready to be applied to the session
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub ticket: GenerationTicket,
    pub result: Result<TestCase, GenerationError>,
}

/// Dispatches generation requests to background threads
pub struct GenerationWorker {
    result_tx: mpsc::Sender<GenerationResult>,
    result_rx: mpsc::Receiver<GenerationResult>,
    pending: Arc<AtomicUsize>,
}

impl Default for GenerationWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationWorker {
    pub fn new() -> Self {
        let (result_tx, result_rx) = mpsc::channel();
        Self {
            result_tx,
            result_rx,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of requests that have not produced a result yet
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Starts a request in the background
    pub fn submit(&self, ticket: GenerationTicket, generator: Arc<dyn TestCaseGenerator>) {
        let result_tx = self.result_tx.clone();
        let pending = Arc::clone(&self.pending);
        pending.fetch_add(1, Ordering::SeqCst);

        thread::spawn(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                generator.generate(&ticket.requirement)
            }))
            .unwrap_or_else(|_| Err(GenerationError::Failed("generator panicked".to_string())));

            // Receiver gone means the session ended; nothing to report to
            let _ = result_tx.send(GenerationResult { ticket, result });
            // Only after the send, so pending() == 0 implies the result is receivable
            pending.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Try to receive a completed result without blocking
    pub fn try_recv_result(&self) -> Option<GenerationResult> {
        self.result_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next completed result
    pub fn recv_result_timeout(&self, timeout: Duration) -> Option<GenerationResult> {
        self.result_rx.recv_timeout(timeout).ok()
    }

    /// Receive all results that have already completed
    pub fn recv_all_results(&self) -> Vec<GenerationResult> {
        let mut results = Vec::new();
        while let Some(result) = self.try_recv_result() {
            results.push(result);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GenerationMode, LiveGenerator, OfflineGenerator};
    use crate::models::Requirement;
    use crate::parser::parse_requirements;
    use crate::session::{GenerationOutcome, GenerationSession};

    struct PanickingGenerator;

    fn wait_until_idle(worker: &GenerationWorker) {
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while worker.pending() > 0 {
            assert!(std::time::Instant::now() < deadline, "worker never went idle");
            thread::sleep(Duration::from_millis(5));
        }
    }

    impl TestCaseGenerator for PanickingGenerator {
        fn mode(&self) -> GenerationMode {
            GenerationMode::Live
        }

        fn generate(&self, _requirement: &Requirement) -> Result<TestCase, GenerationError> {
            panic!("backend exploded");
        }
    }

    #[test]
    fn test_result_is_delivered() {
        let worker = GenerationWorker::new();
        let mut session = GenerationSession::new(GenerationMode::Offline);
        session.replace_requirements(parse_requirements("a\nb"));

        let ticket = session.begin_generation("REQ-2").unwrap();
        worker.submit(ticket, Arc::new(OfflineGenerator::new()));

        let done = worker.recv_result_timeout(Duration::from_secs(5)).unwrap();
        let outcome = session.complete_generation(&done.ticket, done.result);
        assert!(matches!(outcome, GenerationOutcome::Generated { .. }));
        wait_until_idle(&worker);
    }

    #[test]
    fn test_result_is_receivable_once_idle() {
        let worker = GenerationWorker::new();
        let mut session = GenerationSession::new(GenerationMode::Live);
        session.replace_requirements(parse_requirements("a"));

        let ticket = session.begin_generation("REQ-1").unwrap();
        worker.submit(ticket, Arc::new(LiveGenerator::new(Duration::from_millis(20))));

        wait_until_idle(&worker);
        let done = worker.try_recv_result().expect("result sent before pending dropped");
        assert_eq!(done.ticket.req_id(), "REQ-1");
        assert!(worker.try_recv_result().is_none());
    }

    #[test]
    fn test_panic_becomes_failure() {
        let worker = GenerationWorker::new();
        let mut session = GenerationSession::new(GenerationMode::Live);
        session.replace_requirements(parse_requirements("a"));

        let ticket = session.begin_generation("REQ-1").unwrap();
        worker.submit(ticket, Arc::new(PanickingGenerator));

        let done = worker.recv_result_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(done.result, Err(GenerationError::Failed(_))));
    }

    #[test]
    fn test_overlapping_requests_keep_latest() {
        let worker = GenerationWorker::new();
        let mut session = GenerationSession::new(GenerationMode::Live);
        session.replace_requirements(parse_requirements("a\nb"));

        let slow = session.begin_generation("REQ-1").unwrap();
        worker.submit(slow, Arc::new(LiveGenerator::new(Duration::from_millis(200))));

        let fast = session.begin_generation("REQ-2").unwrap();
        worker.submit(fast, Arc::new(LiveGenerator::new(Duration::ZERO)));

        let mut outcomes = Vec::new();
        for _ in 0..2 {
            let done = worker.recv_result_timeout(Duration::from_secs(5)).unwrap();
            outcomes.push(session.complete_generation(&done.ticket, done.result));
        }

        assert!(outcomes.contains(&GenerationOutcome::Stale { req_id: "REQ-1".into() }));
        assert_eq!(session.current_test_case().unwrap().test_case_id, "TC-002");
        wait_until_idle(&worker);
        assert!(worker.recv_all_results().is_empty());
    }
}
