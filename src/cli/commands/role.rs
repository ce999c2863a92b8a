//! Role command implementation.

use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::{RoleChange, format_role_label};
use crate::model::Role;
use crate::service::profiles;

use super::{DeskContext, OutputOptions};

/// Change a profile's role. Full admins only.
///
/// # Errors
///
/// Returns `InvalidRole`, `PermissionDenied`, `ProfileNotFound`, `LastAdmin`,
/// or a database error.
pub fn execute(target: &str, role: &str, output: &OutputOptions, cli: &CliOverrides) -> Result<()> {
    let role: Role = role.parse()?;
    let (mut ctx, mut session) = DeskContext::signed_in(cli)?;
    let before = profiles::resolve(&ctx.storage, target)?;
    let after = profiles::set_role(&mut ctx.storage, &mut session, &before.id, role)?;

    let change = RoleChange {
        id: after.id,
        email: after.email,
        from: before.role,
        to: after.role,
    };
    if output.json {
        return output.print_json(&change);
    }
    output.say(format!(
        "{} <{}>: {} -> {}",
        change.id,
        change.email,
        format_role_label(change.from, output.use_color),
        format_role_label(change.to, output.use_color)
    ));
    Ok(())
}
