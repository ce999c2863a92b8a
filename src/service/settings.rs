//! Desk-wide admin settings.

use crate::error::{DeskError, Result};
use crate::model::{AdminSetting, HIDE_ADMIN_SIGNUP};
use crate::policy::{Capability, authorize};
use crate::session::Session;
use crate::storage::SqliteStorage;
use serde_json::Value;
use tracing::info;

/// Keys that may be stored.
pub const KNOWN_SETTINGS: &[&str] = &[HIDE_ADMIN_SIGNUP];

/// Read a setting. Anyone may read.
///
/// # Errors
///
/// Returns a database error if the read fails.
pub fn get(storage: &SqliteStorage, key: &str) -> Result<Option<AdminSetting>> {
    storage.get_setting(key)
}

/// Store a setting. Full admins only.
///
/// # Errors
///
/// Returns `PermissionDenied`, a validation error for an unknown key or a
/// value of the wrong type, or a database error.
pub fn set(
    storage: &mut SqliteStorage,
    session: &Session,
    key: &str,
    value: Value,
) -> Result<AdminSetting> {
    authorize(session.role(), Capability::ManageSettings)?;

    if !KNOWN_SETTINGS.contains(&key) {
        return Err(DeskError::validation(
            "key",
            format!("unknown setting '{key}' (known: {})", KNOWN_SETTINGS.join(", ")),
        ));
    }
    if key == HIDE_ADMIN_SIGNUP && !value.is_boolean() {
        return Err(DeskError::validation("value", "must be true or false"));
    }

    let setting = storage.set_setting(key, &value)?;
    info!(%key, %value, by = %session.profile_id(), "Setting updated");
    Ok(setting)
}

/// Whether admin self-signup is hidden. Defaults to `false`.
///
/// # Errors
///
/// Returns a database error if the read fails.
pub fn hide_admin_signup(storage: &SqliteStorage) -> Result<bool> {
    Ok(get(storage, HIDE_ADMIN_SIGNUP)?
        .and_then(|s| s.value.as_bool())
        .unwrap_or(false))
}

/// Parse a value typed on the command line: JSON if it parses, else a string.
#[must_use]
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
