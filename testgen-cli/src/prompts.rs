use anyhow::Result;
use colored::Colorize;
use inquire::{Select, Text};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use testgen_core::db;
use testgen_core::export;
use testgen_core::{
    create_generator, AppConfig, GenerationMode, GenerationResult, GenerationSession,
    GenerationWorker, TestCaseGenerator, TestCaseRepository,
};

use crate::{print_notice, print_requirements, print_test_case, report_outcome, NoticeKind};

/// Session menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Upload,
    Generate,
    WaitForPending,
    SwitchMode,
    ShowRequirements,
    ShowTestCase,
    Preview,
    ExportJson,
    Save,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Upload => write!(f, "Upload requirements file"),
            Action::Generate => write!(f, "Generate test case"),
            Action::WaitForPending => write!(f, "Wait for pending generation"),
            Action::SwitchMode => write!(f, "Switch mode"),
            Action::ShowRequirements => write!(f, "Show requirements"),
            Action::ShowTestCase => write!(f, "Show current test case"),
            Action::Preview => write!(f, "Preview as Markdown"),
            Action::ExportJson => write!(f, "Export JSON"),
            Action::Save => write!(f, "Save to database"),
            Action::Quit => write!(f, "Quit"),
        }
    }
}

/// A requirement entry in the picker, with its generation state
struct RequirementChoice {
    req_id: String,
    label: String,
}

impl fmt::Display for RequirementChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Interactive controller: owns the session and renders it after each action
struct Controller<'a> {
    config: &'a AppConfig,
    session: GenerationSession,
    worker: GenerationWorker,
    repo: Option<Box<dyn TestCaseRepository>>,
}

impl<'a> Controller<'a> {
    fn new(config: &'a AppConfig) -> Self {
        Self {
            config,
            session: GenerationSession::new(config.default_mode),
            worker: GenerationWorker::new(),
            repo: None,
        }
    }

    fn generator(&self) -> Arc<dyn TestCaseGenerator> {
        Arc::from(create_generator(self.session.mode(), self.config.live_delay()))
    }

    /// Applies one finished generation and shows the result
    fn apply_result(&mut self, done: GenerationResult) {
        let outcome = self.session.complete_generation(&done.ticket, done.result);
        if report_outcome(&outcome) {
            if let Some(tc) = self.session.current_test_case() {
                println!();
                print_test_case(tc);
                println!();
            }
        }
    }

    /// Applies every finished background generation to the session
    fn drain_results(&mut self) {
        for done in self.worker.recv_all_results() {
            self.apply_result(done);
        }
    }

    fn actions(&self) -> Vec<Action> {
        let mut actions = vec![Action::Upload];
        if !self.session.requirements().is_empty() {
            actions.push(Action::Generate);
            actions.push(Action::ShowRequirements);
        }
        if self.worker.pending() > 0 {
            actions.push(Action::WaitForPending);
        }
        actions.push(Action::SwitchMode);
        if self.session.current_test_case().is_some() {
            actions.extend([
                Action::ShowTestCase,
                Action::Preview,
                Action::ExportJson,
                Action::Save,
            ]);
        }
        actions.push(Action::Quit);
        actions
    }

    fn upload(&mut self, path: &Path) {
        match self.session.upload_file(path) {
            Ok(count) => {
                print_notice(
                    "Requirements Uploaded",
                    &format!("Successfully processed {} requirements.", count),
                    NoticeKind::Success,
                );
                print_requirements(&self.session, None);
            }
            Err(e) => print_notice("Upload Failed", &e.to_string(), NoticeKind::Error),
        }
    }

    fn prompt_upload(&mut self) -> Result<()> {
        let input = Text::new("Requirements file (.txt):").prompt()?;
        let input = input.trim();
        if !input.is_empty() {
            self.upload(&PathBuf::from(input));
        }
        Ok(())
    }

    fn prompt_generate(&mut self) -> Result<()> {
        let choices: Vec<RequirementChoice> = self
            .session
            .requirements()
            .iter()
            .map(|req| {
                let marker = if self.session.is_generating(&req.req_id) {
                    " (generating...)"
                } else if self.session.has_generated(&req.req_id) {
                    " (regenerate)"
                } else {
                    ""
                };
                RequirementChoice {
                    req_id: req.req_id.clone(),
                    label: format!("{}: {}{}", req.req_id, req.title, marker),
                }
            })
            .collect();

        let choice = Select::new("Requirement:", choices).prompt()?;

        if let Some(ticket) = self.session.begin_generation(&choice.req_id) {
            println!(
                "Generating test case for {} ({} mode)...",
                choice.req_id.cyan(),
                self.session.mode()
            );
            self.worker.submit(ticket, self.generator());

            // Offline answers immediately; give it a moment so the result shows now
            if self.session.mode() == GenerationMode::Offline {
                if let Some(done) = self.worker.recv_result_timeout(Duration::from_millis(500)) {
                    self.apply_result(done);
                }
            }
        }
        Ok(())
    }

    fn wait_for_pending(&mut self) {
        while self.worker.pending() > 0 {
            if let Some(done) = self.worker.recv_result_timeout(Duration::from_millis(250)) {
                self.apply_result(done);
            }
        }
        self.drain_results();
    }

    fn prompt_mode(&mut self) -> Result<()> {
        let modes = vec![GenerationMode::Offline, GenerationMode::Live];
        let mode = Select::new("Mode:", modes).prompt()?;
        self.session.set_mode(mode);
        if mode == GenerationMode::Live {
            print_notice(
                "Live Mode",
                "No AI backend is connected; live generation returns a placeholder.",
                NoticeKind::Warning,
            );
        }
        Ok(())
    }

    fn export_json(&self) -> Result<()> {
        let Some(tc) = self.session.current_test_case() else {
            return Ok(());
        };

        let default_name = format!("{}.json", tc.test_case_id);
        let input = Text::new("Output file:")
            .with_default(&default_name)
            .prompt()?;

        match export::export_json(tc, Path::new(input.trim())) {
            Ok(()) => println!("Exported JSON to {}", input.trim()),
            Err(e) => print_notice("Export Failed", &format!("{:#}", e), NoticeKind::Error),
        }
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let Some(tc) = self.session.current_test_case().cloned() else {
            return Ok(());
        };

        if self.repo.is_none() {
            match db::open(&self.config.database()) {
                Ok(repo) => self.repo = Some(repo),
                Err(e) => {
                    print_notice("Save Failed", &format!("{:#}", e), NoticeKind::Error);
                    return Ok(());
                }
            }
        }
        if let Some(repo) = &self.repo {
            if let Err(e) = crate::save_test_case(&**repo, &tc) {
                print_notice("Save Failed", &format!("{:#}", e), NoticeKind::Error);
            }
        }
        Ok(())
    }
}

/// Runs the interactive session until the user quits
pub fn run_session(config: &AppConfig, initial_file: Option<&Path>) -> Result<()> {
    let mut controller = Controller::new(config);

    if let Some(path) = initial_file {
        controller.upload(path);
    }

    loop {
        controller.drain_results();

        let prompt = format!("[{} mode] Action:", controller.session.mode());
        let action = Select::new(&prompt, controller.actions()).prompt()?;

        match action {
            Action::Upload => controller.prompt_upload()?,
            Action::Generate => controller.prompt_generate()?,
            Action::WaitForPending => controller.wait_for_pending(),
            Action::SwitchMode => controller.prompt_mode()?,
            Action::ShowRequirements => print_requirements(&controller.session, None),
            Action::ShowTestCase => {
                if let Some(tc) = controller.session.current_test_case() {
                    print_test_case(tc);
                }
            }
            Action::Preview => {
                if let Some(tc) = controller.session.current_test_case() {
                    println!("{}", export::test_case_to_markdown(tc));
                }
            }
            Action::ExportJson => controller.export_json()?,
            Action::Save => controller.save()?,
            Action::Quit => break,
        }
    }

    Ok(())
}
