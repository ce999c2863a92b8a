//! Role administration.

use crate::error::{DeskError, Result};
use crate::model::{Profile, Role};
use crate::policy::{Capability, authorize};
use crate::session::Session;
use crate::storage::SqliteStorage;
use crate::util::{PROFILE_PREFIX, normalize_id};

/// Find a profile by email (anything with `@`) or by id.
///
/// # Errors
///
/// Returns `ProfileNotFound` if nothing matches.
pub fn resolve(storage: &SqliteStorage, key: &str) -> Result<Profile> {
    let key = key.trim();
    let found = if key.contains('@') {
        storage.find_profile_by_email(key)?
    } else {
        storage.get_profile(&normalize_id(key, PROFILE_PREFIX))?
    };
    found.ok_or_else(|| DeskError::ProfileNotFound {
        id: key.to_string(),
    })
}

/// All profiles. Admin area only.
///
/// # Errors
///
/// Returns `PermissionDenied` for plain users, or a database error.
pub fn list(storage: &SqliteStorage, session: &Session) -> Result<Vec<Profile>> {
    authorize(session.role(), Capability::AccessAdminArea)?;
    storage.list_profiles()
}

/// Change `target`'s role.
///
/// When the session changes its own role, it is refreshed before returning
/// so later checks see the new role.
///
/// # Errors
///
/// Returns `PermissionDenied` unless the session is a full admin,
/// `ProfileNotFound`, `LastAdmin` if this would leave no admin, or a
/// database error.
pub fn set_role(
    storage: &mut SqliteStorage,
    session: &mut Session,
    target: &str,
    role: Role,
) -> Result<Profile> {
    authorize(session.role(), Capability::ManageRoles)?;
    let target = resolve(storage, target)?;
    let updated = storage.set_role(&target.id, role)?;

    if updated.id == session.profile_id() {
        session.refresh(storage)?;
    }

    Ok(updated)
}
