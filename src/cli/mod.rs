//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::CliOverrides;

pub mod commands;

/// Role-scoped ticket desk (`SQLite`)
#[derive(Parser, Debug)]
#[command(name = "td", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Act as this profile (email). Falls back to `actor` in config / `TD_ACTOR`
    #[arg(long = "as", value_name = "EMAIL", global = true)]
    pub actor: Option<String>,

    /// Database path (default: .tickets/tickets.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// `SQLite` busy timeout in ms
    #[arg(long, global = true)]
    pub lock_timeout: Option<u64>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            db: self.db.clone(),
            actor: self.actor.clone(),
            lock_timeout: self.lock_timeout,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a ticket desk in the current directory
    Init {
        /// Overwrite an existing database
        #[arg(long)]
        force: bool,
    },

    /// Register a profile
    Signup(SignupArgs),

    /// Show the acting profile and what it may do
    Whoami,

    /// Open a new ticket
    Create(CreateArgs),

    /// List visible tickets
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show ticket details
    Show {
        /// Ticket ID
        id: String,
    },

    /// Set a ticket's status
    Status {
        /// Ticket ID
        id: String,
        /// New status (New, "In Progress", "On Hold", Completed)
        status: String,
    },

    /// Move a ticket to its next status
    Advance {
        /// Ticket ID
        id: String,
    },

    /// Assign a ticket (or clear the assignee)
    Assign(AssignArgs),

    /// Tickets created within a date range
    History(HistoryArgs),

    /// Per-status ticket counts
    Stats(StatsArgs),

    /// List profiles
    Users,

    /// Change a profile's role
    Role {
        /// Profile email or ID
        profile: String,
        /// New role (user, it_admin, maintenance_admin, housekeeping_admin, admin)
        role: String,
    },

    /// Read or change desk settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SignupArgs {
    /// Email address
    pub email: String,

    /// Full name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Request the admin role (only while admin signup is open)
    #[arg(long)]
    pub admin: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    /// Ticket title
    pub title: String,

    /// Category (IT, Maintenance, Housekeeping)
    #[arg(long, short = 'c')]
    pub category: String,

    /// Longer description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Due date (RFC3339, YYYY-MM-DD, +3d, tomorrow)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Match title, description or requester name
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by status
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Filter by assignee (email or ID)
    #[arg(long, conflicts_with = "unassigned")]
    pub assignee: Option<String>,

    /// Only tickets with no assignee
    #[arg(long)]
    pub unassigned: bool,

    /// Maximum number of tickets
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AssignArgs {
    /// Ticket ID
    pub id: String,

    /// Assignee email or ID
    #[arg(required_unless_present = "clear", conflicts_with = "clear")]
    pub assignee: Option<String>,

    /// Remove the current assignee
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct HistoryArgs {
    /// Created on or after (YYYY-MM-DD, RFC3339, +Nd)
    #[arg(long)]
    pub from: Option<String>,

    /// Created on or before
    #[arg(long)]
    pub to: Option<String>,

    #[command(flatten)]
    pub filters: ListArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct StatsArgs {
    /// Only count this category
    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommands {
    /// Print a setting
    Get {
        /// Setting key (e.g., hide_admin_signup)
        key: String,
    },
    /// Store a setting (admins only)
    Set {
        key: String,
        /// JSON value; bare words are stored as strings
        value: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_actor_flag() {
        let cli = Cli::parse_from(["td", "list", "--as", "ada@example.com", "--json"]);
        assert_eq!(cli.actor.as_deref(), Some("ada@example.com"));
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::List(_)));
        assert_eq!(cli.overrides().actor.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_assign_requires_target_or_clear() {
        assert!(Cli::try_parse_from(["td", "assign", "tk-1"]).is_err());
        assert!(Cli::try_parse_from(["td", "assign", "tk-1", "--clear"]).is_ok());
        assert!(Cli::try_parse_from(["td", "assign", "tk-1", "bo@x.io", "--clear"]).is_err());
    }

    #[test]
    fn test_history_accepts_list_filters() {
        let cli = Cli::parse_from([
            "td", "history", "--from", "2025-01-01", "--category", "IT",
        ]);
        let Commands::History(args) = cli.command else {
            panic!("expected history");
        };
        assert_eq!(args.from.as_deref(), Some("2025-01-01"));
        assert_eq!(args.filters.category.as_deref(), Some("IT"));
    }
}
