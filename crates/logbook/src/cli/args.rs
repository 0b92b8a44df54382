//! CLI argument structs for all commands.
//!
//! Each command has its own argument struct with clap derive attributes
//! for parsing and validation.

use clap::{ArgGroup, Parser, Subcommand};

use super::types::{DiagramFormatArg, IssueTypeArg};
use super::validators::{IdList, parse_id_list, validate_issue_id, validate_text, validate_title};
use crate::domain::{DEFAULT_PRIORITY, MAX_PRIORITY};
use crate::query::IssueFilter;

/// Issue subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum IssueCommand {
    /// List issues (open issues by default)
    List(ListArgs),

    /// Show one or more issues in detail
    Show(ShowArgs),

    /// Create a new issue
    Create(CreateArgs),

    /// Close an issue with a reason
    Close(CloseArgs),

    /// Add a note to an issue
    Note(NoteArgs),

    /// Add dependencies to an issue
    AddDep(DepArgs),

    /// Remove dependencies from an issue
    RemoveDep(DepArgs),

    /// Render the dependency diagram
    Diagram(DiagramArgs),
}

/// Session subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// Show sessions (the latest one by default)
    Show(SessionShowArgs),

    /// List open questions across all sessions
    OpenQuestions,

    /// List next actions across all sessions, most recent first
    NextActions,

    /// Print a markdown timeline of sessions
    Timeline,

    /// Print a markdown summary of sessions
    Summary,

    /// Record a new session
    Create(SessionCreateArgs),
}

/// Arguments for `issues list`
#[derive(Parser, Debug, Clone)]
#[command(group(ArgGroup::new("filter").args(["open", "closed", "ready", "all"])))]
pub struct ListArgs {
    /// Show open issues (default)
    #[arg(long)]
    pub open: bool,

    /// Show closed issues
    #[arg(long)]
    pub closed: bool,

    /// Show open issues with no open dependency
    #[arg(long)]
    pub ready: bool,

    /// Show every issue
    #[arg(long)]
    pub all: bool,
}

impl ListArgs {
    /// The selected filter.
    pub fn filter(&self) -> IssueFilter {
        if self.closed {
            IssueFilter::Closed
        } else if self.ready {
            IssueFilter::Ready
        } else if self.all {
            IssueFilter::All
        } else {
            IssueFilter::Open
        }
    }
}

/// Arguments for `issues show`
#[derive(Parser, Debug, Clone)]
pub struct ShowArgs {
    /// Issue IDs to display (space- or comma-separated)
    #[arg(required = true, value_parser = parse_id_list)]
    pub ids: Vec<IdList>,
}

/// Arguments for `issues create`
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Issue title
    #[arg(value_parser = validate_title)]
    pub title: String,

    /// Issue type
    #[arg(short = 't', long = "type", value_enum, default_value = "task")]
    pub issue_type: IssueTypeArg,

    /// Priority level (0=critical, 1=high, 2=medium, 3=low, 4=backlog)
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u8).range(0..=i64::from(MAX_PRIORITY)),
        default_value_t = DEFAULT_PRIORITY
    )]
    pub priority: u8,

    /// Detailed description
    #[arg(short, long, default_value = "", value_parser = validate_text)]
    pub description: String,

    /// Dependencies (comma-separated issue IDs)
    #[arg(short = 'b', long = "depends-on", value_parser = parse_id_list)]
    pub depends_on: Option<IdList>,

    /// Labels (comma-separated)
    #[arg(short, long, default_value = "")]
    pub labels: String,
}

/// Arguments for `issues close`
#[derive(Parser, Debug, Clone)]
pub struct CloseArgs {
    /// Issue ID to close
    #[arg(value_parser = validate_issue_id)]
    pub id: String,

    /// Reason for closing
    #[arg(value_parser = validate_text)]
    pub reason: String,
}

/// Arguments for `issues note`
#[derive(Parser, Debug, Clone)]
pub struct NoteArgs {
    /// Issue ID
    #[arg(value_parser = validate_issue_id)]
    pub id: String,

    /// Note content
    #[arg(value_parser = validate_text)]
    pub content: String,
}

/// Arguments for `issues add-dep` and `issues remove-dep`
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Issue ID
    #[arg(value_parser = validate_issue_id)]
    pub id: String,

    /// Dependency IDs (comma-separated)
    #[arg(value_parser = parse_id_list)]
    pub deps: IdList,
}

/// Arguments for `issues diagram`
#[derive(Parser, Debug, Clone)]
pub struct DiagramArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "mermaid")]
    pub format: DiagramFormatArg,

    /// Include closed issues
    #[arg(long)]
    pub include_closed: bool,
}

/// Arguments for `sessions show`
#[derive(Parser, Debug, Clone)]
#[command(group(ArgGroup::new("selection").args(["last", "all", "issue", "topic", "user"])))]
pub struct SessionShowArgs {
    /// Show the last N sessions
    #[arg(long, value_name = "N")]
    pub last: Option<usize>,

    /// Show every session
    #[arg(long)]
    pub all: bool,

    /// Sessions that worked on an issue
    #[arg(long, value_name = "ID", value_parser = validate_issue_id)]
    pub issue: Option<String>,

    /// Sessions whose topic contains a keyword (case-insensitive)
    #[arg(long, value_name = "KEYWORD")]
    pub topic: Option<String>,

    /// Sessions belonging to a user prefix
    #[arg(long, value_name = "PREFIX")]
    pub user: Option<String>,
}

/// Arguments for `sessions create`
#[derive(Parser, Debug, Clone)]
pub struct SessionCreateArgs {
    /// Session topic
    #[arg(value_parser = validate_text)]
    pub topic: String,

    /// A learning (repeatable)
    #[arg(short = 'l', long = "learning", value_name = "TEXT", value_parser = validate_text)]
    pub learnings: Vec<String>,

    /// An open question (repeatable)
    #[arg(short = 'q', long = "question", value_name = "TEXT", value_parser = validate_text)]
    pub questions: Vec<String>,

    /// A next action (repeatable)
    #[arg(short = 'a', long = "action", value_name = "TEXT", value_parser = validate_text)]
    pub actions: Vec<String>,

    /// Issues worked on (comma-separated IDs)
    #[arg(short, long, value_name = "IDS", value_parser = parse_id_list)]
    pub issues: Option<IdList>,
}
