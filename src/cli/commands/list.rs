//! List command implementation.

use crate::cli::ListArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{TextFormatOptions, format_ticket_row};
use crate::model::TicketDetails;
use crate::service::tickets;

use super::{DeskContext, OutputOptions, filters_from_args};

/// List the tickets the actor may see, newest first.
///
/// # Errors
///
/// Returns a parse error for a bad filter, `NotSignedIn`, or a database error.
pub fn execute(args: &ListArgs, output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let (ctx, session) = DeskContext::signed_in(cli)?;
    let filters = filters_from_args(&ctx.storage, args)?;
    let found = tickets::list(&ctx.storage, &session, &filters)?;

    if output.json {
        return output.print_json(&found);
    }
    print_rows(&found, output);
    Ok(())
}

pub(super) fn print_rows(found: &[TicketDetails], output: &OutputOptions) {
    if found.is_empty() {
        output.say("No tickets found.");
        return;
    }
    let options = TextFormatOptions {
        use_color: output.use_color,
        max_width: output.max_width(),
    };
    for details in found {
        output.say(format_ticket_row(details, options));
    }
    output.say(format!("\n{} ticket(s)", found.len()));
}
