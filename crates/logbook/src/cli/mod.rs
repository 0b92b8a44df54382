//! CLI argument parsing and command dispatch.
//!
//! This module provides the command-line interface for logbook using clap's derive API.
//! Each command has its own argument struct with validation and helpful error messages.
//!
//! # Commands
//!
//! - `issues`: list, show, create, close, note, add-dep, remove-dep, diagram
//! - `sessions`: show, open-questions, next-actions, timeline, summary, create
//!
//! # Global Flags
//!
//! - `--json`: Output issue listings and write results in JSON format
//!
//! # Example
//!
//! ```bash
//! logbook issues create "Fix login redirect" -t bug -p 1
//! logbook issues add-dep dp-003 dp-001,dp-002
//! logbook issues diagram --format ascii
//! logbook sessions create "auth refactor" -l "Tokens expire hourly" -i dp-003
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

// Re-export argument structs
pub use args::{
    CloseArgs, CreateArgs, DepArgs, DiagramArgs, IssueCommand, ListArgs, NoteArgs,
    SessionCommand, SessionCreateArgs, SessionShowArgs, ShowArgs,
};

// Re-export types
pub use types::{DiagramFormatArg, IssueTypeArg};

// Re-export validators for external use
pub use validators::{
    IdList, parse_id_list, split_list, validate_issue_id, validate_text, validate_title,
};

use crate::error::{Error, ErrorCategory};
use crate::output::{self, OutputConfig};

/// Logbook - local-first issue and session tracking
///
/// Each writer appends to its own log under `.issues/` and `.memory/`, so
/// several people can record work in the same repository without conflicts.
#[derive(Parser, Debug)]
#[command(name = "logbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Track issues and their dependencies
    Issues {
        /// Issue subcommand
        #[command(subcommand)]
        command: IssueCommand,
    },

    /// Record and query work sessions
    Sessions {
        /// Session subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Logbook issue and session tracking");
            println!("Use --help for more information");
            return Ok(());
        };

        let app = App::open(&std::env::current_dir()?).await?;

        match command {
            Commands::Issues { command } => match command {
                IssueCommand::List(args) => execute::execute_list(&app, args, output_mode).await,
                IssueCommand::Show(args) => execute::execute_show(&app, args, output_mode).await,
                IssueCommand::Create(args) => {
                    execute::execute_create(&app, args, output_mode).await
                }
                IssueCommand::Close(args) => execute::execute_close(&app, args, output_mode).await,
                IssueCommand::Note(args) => execute::execute_note(&app, args, output_mode).await,
                IssueCommand::AddDep(args) => {
                    execute::execute_add_dep(&app, args, output_mode).await
                }
                IssueCommand::RemoveDep(args) => {
                    execute::execute_remove_dep(&app, args, output_mode).await
                }
                IssueCommand::Diagram(args) => execute::execute_diagram(&app, args).await,
            },
            Commands::Sessions { command } => match command {
                SessionCommand::Show(args) => execute::execute_session_show(&app, args).await,
                SessionCommand::OpenQuestions => execute::execute_open_questions(&app).await,
                SessionCommand::NextActions => execute::execute_next_actions(&app).await,
                SessionCommand::Timeline => execute::execute_timeline(&app).await,
                SessionCommand::Summary => execute::execute_summary(&app).await,
                SessionCommand::Create(args) => execute::execute_session_create(&app, args).await,
            },
        }
    }
}

/// Process exit code for a failed command.
///
/// Caller mistakes (unknown IDs, disallowed state changes) exit with 1.
/// Problems with the logs or the environment exit with 3, leaving 2 to
/// clap's usage errors.
#[must_use]
pub fn exit_code(category: ErrorCategory) -> u8 {
    match category {
        ErrorCategory::Reference | ErrorCategory::InvalidState => 1,
        ErrorCategory::MalformedLog | ErrorCategory::Io | ErrorCategory::Config => 3,
    }
}

/// Print a command error to stderr, as JSON when `json` is set.
pub fn report_error(err: &Error, json: bool) {
    if json {
        eprintln!("{}", serde_json::json!({ "error": err.to_string() }));
    } else {
        let config = OutputConfig::from_env();
        eprintln!("{} {err}", output::error("Error:", &config));
    }
}
