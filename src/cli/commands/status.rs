//! Status command implementation.

use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::format_status_label;
use crate::model::Status;
use crate::service::tickets;

use super::{DeskContext, OutputOptions};

/// Set a ticket's status directly.
///
/// # Errors
///
/// Returns `InvalidStatus`, `PermissionDenied` for users, `TicketNotFound`,
/// or a database error.
pub fn execute(id: &str, status: &str, output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let status: Status = status.parse()?;
    let (mut ctx, session) = DeskContext::signed_in(cli)?;
    let ticket = tickets::change_status(&mut ctx.storage, &session, id, status)?;

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
