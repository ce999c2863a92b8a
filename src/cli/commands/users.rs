//! Users command implementation.

use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::format_profile_line;
use crate::service::profiles;

use super::{DeskContext, OutputOptions};

/// List every profile. Admin area only.
///
/// # Errors
///
/// Returns `PermissionDenied` for users, or a database error.
pub fn execute(output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let (ctx, session) = DeskContext::signed_in(cli)?;
    let all = profiles::list(&ctx.storage, &session)?;

    if output.json {
        return output.print_json(&all);
    }
    for profile in &all {
        output.say(format_profile_line(profile, output.use_color));
    }
    Ok(())
}
