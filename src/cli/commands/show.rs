//! Show command implementation.

use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::format_ticket_details;
use crate::service::tickets;

use super::{DeskContext, OutputOptions};

/// Show one ticket.
///
/// # Errors
///
/// Returns `TicketNotFound` when it is missing or outside the actor's view.
pub fn execute(id: &str, output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let (ctx, session) = DeskContext::signed_in(cli)?;
    let details = tickets::show(&ctx.storage, &session, id)?;

    if output.json {
        return output.print_json(&details);
    }
    if !output.quiet {
        print!("{}", format_ticket_details(&details, output.use_color));
    }
    Ok(())
}
