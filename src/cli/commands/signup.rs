//! Signup command implementation.

use crate::cli::SignupArgs;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{SignupView, format_role_label};
use crate::model::Role;
use crate::session;

use super::{DeskContext, OutputOptions};

/// Register a profile. The first profile on a desk becomes its admin.
///
/// # Errors
///
/// Returns a validation error for bad input or a duplicate email,
/// `PermissionDenied` when `--admin` is used while admin signup is hidden,
/// or a database error.
pub fn execute(args: &SignupArgs, output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let mut ctx = DeskContext::open(cli)?;
    let requested = if args.admin { Role::Admin } else { Role::User };
    let signed_up = session::register(&mut ctx.storage, &args.email, &args.name, requested)?;

    let profile = signed_up.profile().clone();
    let view = SignupView {
        bootstrapped: profile.role == Role::Admin && requested != Role::Admin,
        profile,
    };

    if output.json {
        return output.print_json(&view);
    }

    output.say(format!(
        "Registered {} <{}> as {} ({})",
        view.profile.full_name,
        view.profile.email,
        format_role_label(view.profile.role, output.use_color),
        view.profile.id
    ));
    if view.bootstrapped {
        output.say("No admin existed yet, so this profile was made admin.");
    }
    Ok(())
}
