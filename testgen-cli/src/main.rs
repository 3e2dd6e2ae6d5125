mod cli;
mod prompts;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use testgen_core::db;
use testgen_core::export;
use testgen_core::{
    create_generator, get_config_path, AppConfig, GenerationMode, GenerationOutcome,
    GenerationSession, GenerationWorker, OfflineGenerator, TestCase, TestCaseGenerator,
    TestCaseRepository, TestCaseStatus,
};

use crate::cli::{Cli, Command, ConfigCommand, SavedCommand};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => get_config_path()?,
    };
    let config = effective_config(&cli, &config_path)?;

    match &cli.command {
        Command::Parse { file, limit } => {
            parse_file(&config, file, *limit)?;
        }
        Command::Generate {
            file,
            req,
            json_out,
            markdown,
            save,
        } => {
            generate_once(&config, file, req, json_out.as_deref(), *markdown, *save)?;
        }
        Command::Samples => {
            list_samples();
        }
        Command::Session { file } => {
            prompts::run_session(&config, file.as_deref())?;
        }
        Command::Saved(saved_cmd) => {
            handle_saved_command(saved_cmd, &config)?;
        }
        Command::Config(config_cmd) => {
            handle_config_command(config_cmd, &config, &config_path)?;
        }
    }

    Ok(())
}

/// Loads the config file and applies command-line overrides
fn effective_config(cli: &Cli, config_path: &Path) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_default(config_path)?;

    if let Some(mode) = &cli.mode {
        config.default_mode = mode.parse::<GenerationMode>().map_err(|e| anyhow::anyhow!(e))?;
    }
    if let Some(delay_ms) = cli.delay_ms {
        config.live_delay_ms = delay_ms;
    }
    if let Some(db_path) = &cli.db {
        config.database_path = db_path.clone();
    }

    Ok(config)
}

fn parse_file(config: &AppConfig, file: &Path, limit: Option<usize>) -> Result<()> {
    let mut session = GenerationSession::new(config.default_mode);
    let count = session.upload_file(file)?;

    print_notice(
        "Requirements Uploaded",
        &format!("Successfully processed {} requirements.", count),
        NoticeKind::Success,
    );
    print_requirements(&session, limit);

    Ok(())
}

fn generate_once(
    config: &AppConfig,
    file: &Path,
    req_id: &str,
    json_out: Option<&Path>,
    markdown: bool,
    save: bool,
) -> Result<()> {
    let mut session = GenerationSession::new(config.default_mode);
    session.upload_file(file)?;

    let ticket = session
        .begin_generation(req_id)
        .with_context(|| format!("Requirement not found: {}", req_id))?;

    println!(
        "Generating test case for {} ({} mode)...",
        req_id.cyan(),
        session.mode()
    );

    let worker = GenerationWorker::new();
    let generator: Arc<dyn TestCaseGenerator> =
        Arc::from(create_generator(session.mode(), config.live_delay()));
    worker.submit(ticket, generator);

    let done = loop {
        if let Some(done) = worker.recv_result_timeout(Duration::from_millis(250)) {
            break done;
        }
        log::debug!("Waiting on {} pending generation(s)", worker.pending());
    };

    let outcome = session.complete_generation(&done.ticket, done.result);
    if !report_outcome(&outcome) {
        return Ok(());
    }

    let Some(test_case) = session.current_test_case() else {
        return Ok(());
    };

    if markdown {
        println!("{}", export::test_case_to_markdown(test_case));
    } else {
        print_test_case(test_case);
        println!();
        println!("{}", "JSON Structure".bold());
        println!("{}", export::test_case_to_json(test_case)?);
    }

    if let Some(path) = json_out {
        export::export_json(test_case, path)?;
        println!("Exported JSON to {}", path.display());
    }

    if save {
        let repo = db::open(&config.database())?;
        save_test_case(&*repo, test_case)?;
    }

    Ok(())
}

fn list_samples() {
    let generator = OfflineGenerator::new();

    println!("{:<8} | {:<8} | {}", "REQ-ID", "TC-ID", "Title");
    println!("{}", "-".repeat(72));
    for tc in generator.samples() {
        println!("{:<8} | {:<8} | {}", tc.req_id, tc.test_case_id, tc.title);
    }
}

fn handle_saved_command(cmd: &SavedCommand, config: &AppConfig) -> Result<()> {
    let repo = db::open(&config.database())?;

    match cmd {
        SavedCommand::List { status } => {
            let status = status
                .as_deref()
                .map(str::parse::<TestCaseStatus>)
                .transpose()
                .map_err(|e| anyhow::anyhow!(e))?;
            let records: Vec<_> = repo
                .list_test_cases()?
                .into_iter()
                .filter(|record| status.map_or(true, |s| record.test_case.status == s))
                .collect();
            if records.is_empty() {
                println!("{}", "No saved test cases.".yellow());
                return Ok(());
            }

            println!(
                "{:<8} | {:<8} | {:<16} | {:<25} | {}",
                "TC-ID", "REQ-ID", "Status", "Saved", "Title"
            );
            println!("{}", "-".repeat(100));
            for record in records {
                let tc = &record.test_case;
                println!(
                    "{:<8} | {:<8} | {:<16} | {:<25} | {}",
                    tc.test_case_id,
                    tc.req_id,
                    tc.status.to_string(),
                    record.saved_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                    tc.title
                );
            }
        }
        SavedCommand::Show { id, json } => {
            let record = repo
                .get_test_case(id)?
                .with_context(|| format!("Test case not found: {}", id))?;

            if *json {
                println!("{}", export::test_case_to_json(&record.test_case)?);
            } else {
                println!("{}: {}", "Record".blue(), record.id);
                println!("{}: {}", "Saved".blue(), record.saved_at);
                println!();
                print_test_case(&record.test_case);
            }
        }
        SavedCommand::Delete { id, yes } => {
            let confirmed = *yes
                || inquire::Confirm::new(&format!("Delete saved test case {}?", id))
                    .with_default(false)
                    .prompt()?;

            if confirmed {
                repo.delete_test_case(id)?;
                println!("{}", format!("Deleted {}", id).green());
            } else {
                println!("Cancelled.");
            }
        }
    }

    Ok(())
}

fn handle_config_command(cmd: &ConfigCommand, config: &AppConfig, path: &Path) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            println!("{}: {}", "Config file".blue(), path.display());
            println!("{}: {}", "Default mode".blue(), config.default_mode);
            println!("{}: {} ms", "Live delay".blue(), config.live_delay_ms);
            let database = config.database();
            println!(
                "{}: {} ({})",
                "Database".blue(),
                database.path.display(),
                database.backend_type
            );
        }
        ConfigCommand::Init => {
            if AppConfig::create_default(path)? {
                println!("{}", format!("Wrote default config to {}", path.display()).green());
            } else {
                println!("Config already exists at {}", path.display());
            }
        }
    }

    Ok(())
}

pub(crate) fn save_test_case(repo: &dyn TestCaseRepository, test_case: &TestCase) -> Result<()> {
    repo.save_test_case(test_case)?;
    log::info!(
        "Saved {} to {} store {}",
        test_case.test_case_id,
        repo.backend_type(),
        repo.path().display()
    );
    print_notice(
        "Test Case Saved",
        &format!("{} saved to database successfully.", test_case.test_case_id),
        NoticeKind::Success,
    );
    Ok(())
}

pub(crate) enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// Prints a transient user-visible notice
pub(crate) fn print_notice(title: &str, description: &str, kind: NoticeKind) {
    let title = match kind {
        NoticeKind::Success => title.green().bold(),
        NoticeKind::Warning => title.yellow().bold(),
        NoticeKind::Error => title.red().bold(),
    };
    println!("{}: {}", title, description);
}

/// Prints the notice for a generation outcome. Returns true if a test case was produced.
pub(crate) fn report_outcome(outcome: &GenerationOutcome) -> bool {
    match outcome {
        GenerationOutcome::Generated { req_id, .. } => {
            print_notice(
                "Test Case Generated",
                &format!("Successfully generated test case for {}", req_id),
                NoticeKind::Success,
            );
            true
        }
        GenerationOutcome::NotFound { req_id } => {
            print_notice(
                "No Test Case Available",
                &format!("No sample test case found for {}", req_id),
                NoticeKind::Warning,
            );
            false
        }
        GenerationOutcome::Failed { reason, .. } => {
            print_notice(
                "Generation Failed",
                "Failed to generate test case. Please try again.",
                NoticeKind::Error,
            );
            log::debug!("Generation failure detail: {}", reason);
            false
        }
        // Superseded by a newer request; the user never sees it
        GenerationOutcome::Stale { .. } => false,
    }
}

pub(crate) fn print_requirements(session: &GenerationSession, limit: Option<usize>) {
    let requirements = session.requirements();
    if requirements.is_empty() {
        println!("{}", "No requirements. Upload a file to start.".yellow());
        return;
    }

    let shown = limit.unwrap_or(requirements.len()).min(requirements.len());
    println!(
        "{} ({} of {}, {} generated)",
        "Requirements".bold(),
        shown,
        requirements.len(),
        session.generated_count()
    );
    println!("{:<8} | {:<53} | {}", "REQ-ID", "Title", "State");
    println!("{}", "-".repeat(80));

    for req in requirements.iter().take(shown) {
        let state = if session.is_generating(&req.req_id) {
            "Generating...".cyan()
        } else if session.has_generated(&req.req_id) {
            "Done".green()
        } else {
            "".normal()
        };
        println!("{:<8} | {:<53} | {}", req.req_id, req.title, state);
    }
}

pub(crate) fn print_test_case(test_case: &TestCase) {
    let status = match test_case.status {
        TestCaseStatus::PendingReview => test_case.status.to_string().yellow(),
        TestCaseStatus::Approved => test_case.status.to_string().green(),
        TestCaseStatus::Rejected => test_case.status.to_string().red(),
    };

    println!(
        "{} [{}] [{}]",
        test_case.title.bold(),
        test_case.test_case_id.cyan(),
        test_case.req_id.cyan()
    );
    println!("{}: {}", "Status".blue(), status);
    println!();

    println!("{}", "Test Steps".bold());
    for step in &test_case.test_steps {
        println!("  {} {}", format!("Step {}:", step.step).blue(), step.action);
        println!("         {} {}", "Expected:".dimmed(), step.expected);
    }
    println!();

    println!("{}", "Expected Results".bold());
    println!("  {}", test_case.expected_results);
    println!();

    let profile = &test_case.data_profile;
    println!("{}", "Data Profile".bold());
    for field in &profile.fields {
        println!("  {} ({})", field.name, field.field_type.dimmed());
    }
    println!("  {}: {}", "Rows".blue(), profile.rows);
    println!("  {}: {}", "Note".blue(), profile.note);
}
