use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Generate test cases from a plain-text requirements document")]
pub struct Cli {
    /// Generation mode: offline (sample lookup) or live (simulated AI)
    #[clap(long, short = 'm')]
    pub mode: Option<String>,

    /// Simulated live latency in milliseconds (overrides config)
    #[clap(long)]
    pub delay_ms: Option<u64>,

    /// Test case database file (.yaml or .db; overrides config)
    #[clap(long)]
    pub db: Option<PathBuf>,

    /// Path to the config file (overrides TESTGEN_CONFIG_PATH)
    #[clap(long)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a requirements file and list its requirements
    Parse {
        /// Requirements document (.txt)
        file: PathBuf,

        /// Show at most this many requirements
        #[clap(long)]
        limit: Option<usize>,
    },

    /// Generate a test case for one requirement
    Generate {
        /// Requirements document (.txt)
        file: PathBuf,

        /// Requirement ID, e.g. REQ-1
        #[clap(long, short = 'r')]
        req: String,

        /// Write the test case as JSON to this file
        #[clap(long)]
        json_out: Option<PathBuf>,

        /// Print a Markdown preview instead of the JSON block
        #[clap(long)]
        markdown: bool,

        /// Save the generated test case to the database
        #[clap(long)]
        save: bool,
    },

    /// List the requirement IDs the offline samples cover
    Samples,

    /// Interactive session: pick requirements, generate, export, save
    Session {
        /// Requirements document (.txt) to start with
        file: Option<PathBuf>,
    },

    /// Manage saved test cases
    #[clap(subcommand)]
    Saved(SavedCommand),

    /// Manage the config file
    #[clap(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum SavedCommand {
    /// List saved test cases
    List {
        /// Only show this status: pending_review, approved or rejected
        #[clap(long)]
        status: Option<String>,
    },

    /// Show a saved test case
    Show {
        /// Test case ID, e.g. TC-001
        id: String,

        /// Print as JSON
        #[clap(long)]
        json: bool,
    },

    /// Delete a saved test case
    Delete {
        /// Test case ID, e.g. TC-001
        id: String,

        /// Skip the confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a default config file if none exists
    Init,
}
