//! Whoami command implementation.

use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{ProfileView, format_role_label};

use super::{DeskContext, OutputOptions};

/// Show the acting profile and its capabilities.
///
/// # Errors
///
/// Returns `NotSignedIn` without a known actor, or a database error.
pub fn execute(output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let (_ctx, session) = DeskContext::signed_in(cli)?;
    let view = ProfileView::new(session.profile().clone());

    if output.json {
        return output.print_json(&view);
    }

    output.say(format!(
        "{} <{}> {}",
        view.profile.full_name, view.profile.email, view.profile.id
    ));
    output.say(format!(
        "Role: {}",
        format_role_label(view.profile.role, output.use_color)
    ));
    if view.capabilities.is_empty() {
        output.say("Can: open and view own tickets");
    } else {
        output.say(format!("Can: {}", view.capabilities.join(", ")));
    }
    Ok(())
}
