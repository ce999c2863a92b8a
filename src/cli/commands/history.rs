//! History command implementation.

use crate::cli::HistoryArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{HistoryView, format_timestamp};
use crate::service::tickets;
use crate::util::time::parse_range_bound;

use super::list::print_rows;
use super::{DeskContext, OutputOptions, filters_from_args};

/// Tickets created within `[--from, --to]`. Dates cover whole days.
///
/// # Errors
///
/// Returns `PermissionDenied` for users, a validation error for a bad or
/// inverted range, or a database error.
pub fn execute(args: &HistoryArgs, output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let from = args
        .from
        .as_deref()
        .map(|raw| parse_range_bound(raw, "from", false))
        .transpose()?;
    let to = args
        .to
        .as_deref()
        .map(|raw| parse_range_bound(raw, "to", true))
        .transpose()?;

    let (ctx, session) = DeskContext::signed_in(cli)?;
    let filters = filters_from_args(&ctx.storage, &args.filters)?;
    let found = tickets::history(&ctx.storage, &session, from, to, &filters)?;

    if output.json {
        return output.print_json(&HistoryView {
            from,
            to,
            count: found.len(),
            tickets: found,
        });
    }

    let bound = |at: Option<&chrono::DateTime<chrono::Utc>>| {
        at.map_or_else(|| "*".to_string(), format_timestamp)
    };
    output.say(format!(
        "Created between {} and {}:",
        bound(from.as_ref()),
        bound(to.as_ref())
    ));
    print_rows(&found, output);
    Ok(())
}
