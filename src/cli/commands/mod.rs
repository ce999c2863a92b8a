//! Command implementations.
//!
//! Each command exposes `execute`, taking its parsed arguments plus the
//! shared [`OutputOptions`] and [`CliOverrides`].

pub mod advance;
pub mod assign;
pub mod completions;
pub mod create;
pub mod history;
pub mod init;
pub mod list;
pub mod role;
pub mod settings;
pub mod show;
pub mod signup;
pub mod stats;
pub mod status;
pub mod users;
pub mod whoami;

use crate::cli::{Cli, ListArgs};
use crate::config::{CliOverrides, DeskConfig};
use crate::error::Result;
use crate::format::terminal_width;
use crate::model::{Category, Status};
use crate::service::profiles;
use crate::session::{Session, sign_in};
use crate::storage::{SqliteStorage, TicketFilters};
use serde::Serialize;
use std::io::{self, IsTerminal};

/// How results are rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
    pub use_color: bool,
}

impl OutputOptions {
    /// Color only for a terminal, and never with `--no-color` or `NO_COLOR`.
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        let use_color = !cli.no_color
            && !cli.json
            && std::env::var_os("NO_COLOR").is_none()
            && io::stdout().is_terminal();
        Self {
            json: cli.json,
            quiet: cli.quiet,
            use_color,
        }
    }

    /// Pretty JSON to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    #[allow(clippy::unused_self)]
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print a human line unless `--quiet`.
    pub fn say(&self, line: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", line.as_ref());
        }
    }

    /// Width available for list rows when writing to a terminal.
    #[must_use]
    pub fn max_width(&self) -> Option<usize> {
        (!self.json && io::stdout().is_terminal()).then(terminal_width)
    }
}

/// An open desk plus the acting session.
pub struct DeskContext {
    pub config: DeskConfig,
    pub storage: SqliteStorage,
}

impl DeskContext {
    /// Discover the desk and open its database.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized`, a config error, or a database error.
    pub fn open(cli: &CliOverrides) -> Result<Self> {
        let config = DeskConfig::load(cli)?;
        let storage = config.open_storage()?;
        Ok(Self { config, storage })
    }

    /// Sign in the configured actor.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` if no actor is configured or it has no account.
    pub fn session(&mut self) -> Result<Session> {
        let email = self.config.require_actor()?.to_string();
        sign_in(&mut self.storage, &email)
    }

    /// Open the desk and sign in in one step.
    ///
    /// # Errors
    ///
    /// Same as [`DeskContext::open`] and [`DeskContext::session`].
    pub fn signed_in(cli: &CliOverrides) -> Result<(Self, Session)> {
        let mut ctx = Self::open(cli)?;
        let session = ctx.session()?;
        Ok((ctx, session))
    }
}

/// Turn list flags into storage filters.
///
/// # Errors
///
/// Returns `InvalidStatus`, `InvalidCategory`, or `ProfileNotFound` for an
/// unknown assignee.
pub fn filters_from_args(storage: &SqliteStorage, args: &ListArgs) -> Result<TicketFilters> {
    let status = args
        .status
        .as_deref()
        .map(str::parse::<Status>)
        .transpose()?;
    let category = args
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()?;
    let assignee = match args.assignee.as_deref() {
        Some(key) => Some(profiles::resolve(storage, key)?.id),
        None => None,
    };

    Ok(TicketFilters {
        search: args.search.clone().filter(|s| !s.trim().is_empty()),
        status,
        category,
        assignee,
        unassigned: args.unassigned,
        limit: args.limit,
        ..TicketFilters::default()
    })
}
