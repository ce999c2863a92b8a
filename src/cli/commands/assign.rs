//! Assign command implementation.

use crate::cli::AssignArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::service::tickets;

use super::{DeskContext, OutputOptions};

/// Assign a ticket or clear its assignee.
///
/// # Errors
///
/// Returns `PermissionDenied` for users, `TicketNotFound`, `ProfileNotFound`
/// for an unknown assignee, or a database error.
pub fn execute(args: &AssignArgs, output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let (mut ctx, session) = DeskContext::signed_in(cli)?;
    let assignee = if args.clear {
        None
    } else {
        args.assignee.as_deref()
    };
    let ticket = tickets::assign(&mut ctx.storage, &session, &args.id, assignee)?;

    if output.json {
        return output.print_json(&ticket);
    }
    match &ticket.assignee_id {
        Some(assignee) => output.say(format!("{} assigned to {assignee}", ticket.id)),
        None => output.say(format!("{} is unassigned", ticket.id)),
    }
    Ok(())
}
