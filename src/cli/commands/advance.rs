//! Advance command implementation.

use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::format_status_label;
use crate::service::tickets;

use super::{DeskContext, OutputOptions};

/// Move a ticket one step along its lifecycle.
///
/// # Errors
///
/// Returns `PermissionDenied` for users, `TicketNotFound`, or a database error.
pub fn execute(id: &str, output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let (mut ctx, session) = DeskContext::signed_in(cli)?;
    let ticket = tickets::advance(&mut ctx.storage, &session, id)?;

    if output.json {
        return output.print_json(&ticket);
    }
    output.say(format!(
        "{} is now {}",
        ticket.id,
        format_status_label(ticket.status, output.use_color)
    ));
    Ok(())
}
