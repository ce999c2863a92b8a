//! Stats command implementation.

use crate::cli::StatsArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::format_stats;
use crate::model::Category;
use crate::service::tickets;
use crate::storage::TicketFilters;

use super::{DeskContext, OutputOptions};

/// Per-status counts over the tickets the actor may see.
///
/// # Errors
///
/// Returns `InvalidCategory`, `NotSignedIn`, or a database error.
pub fn execute(args: &StatsArgs, output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let category = args
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()?;
    let (ctx, session) = DeskContext::signed_in(cli)?;
    let stats = tickets::stats(
        &ctx.storage,
        &session,
        &TicketFilters {
            category,
            ..TicketFilters::default()
        },
    )?;

    if output.json {
        return output.print_json(&stats);
    }
    if !output.quiet {
        print!("{}", format_stats(&stats, output.use_color));
    }
    Ok(())
}
