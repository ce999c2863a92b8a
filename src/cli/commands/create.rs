//! Create command implementation.

use crate::cli::CreateArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{TextFormatOptions, format_ticket_line_with};
use crate::service::tickets::{self, NewTicket};
use crate::util::time::parse_flexible_timestamp;

use super::{DeskContext, OutputOptions};

/// Open a ticket and notify the category's admins.
///
/// A failed notification is reported but the ticket stays created.
///
/// # Errors
///
/// Returns a validation error for bad input, `NotSignedIn`, or a database error.
pub fn execute(args: &CreateArgs, output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let (mut ctx, session) = DeskContext::signed_in(cli)?;

    let due_date = args
        .due
        .as_deref()
        .map(|raw| parse_flexible_timestamp(raw, "due"))
        .transpose()?;

    let input = NewTicket {
        title: args.title.clone(),
        description: args.description.clone(),
        category: args.category.clone(),
        due_date,
    };

    let mailer = ctx.config.mailer();
    let created = tickets::create(&mut ctx.storage, &session, &input, mailer.as_ref())?;

    if output.json {
        return output.print_json(&created);
    }

    output.say(format!(
        "Created {}",
        format_ticket_line_with(
            &created.ticket,
            TextFormatOptions {
                use_color: output.use_color,
                max_width: None,
            }
        )
    ));

    let report = &created.notifications;
    if !report.succeeded.is_empty() {
        output.say(format!("Notified: {}", report.succeeded.join(", ")));
    }
    for failure in &report.failed {
        eprintln!("Warning: could not notify {}: {}", failure.email, failure.error);
    }
    if let Some(error) = &report.error {
        eprintln!("Warning: admins were not notified: {error}");
    }
    Ok(())
}
