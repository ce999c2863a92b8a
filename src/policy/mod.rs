//! Role policy and ticket visibility.
//!
//! Every check here is a pure function of a [`Role`]. Stored role strings
//! are parsed leniently before they get here, so an unknown value already
//! means `User`.

use crate::error::{DeskError, Result};
use crate::model::{Category, Role, Ticket};

/// Roles that administer at least one category (or everything).
const fn is_any_admin(role: Role) -> bool {
    !matches!(role, Role::User)
}

#[must_use]
pub const fn can_change_status(role: Role) -> bool {
    is_any_admin(role)
}

#[must_use]
pub const fn can_assign(role: Role) -> bool {
    is_any_admin(role)
}

#[must_use]
pub const fn can_manage_roles(role: Role) -> bool {
    matches!(role, Role::Admin)
}

#[must_use]
pub const fn can_manage_settings(role: Role) -> bool {
    matches!(role, Role::Admin)
}

#[must_use]
pub const fn can_access_admin_area(role: Role) -> bool {
    is_any_admin(role)
}

/// The dated history view is an admin-area page.
#[must_use]
pub const fn can_view_history(role: Role) -> bool {
    is_any_admin(role)
}

/// A named permission, used for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ChangeStatus,
    Assign,
    ManageRoles,
    ManageSettings,
    AccessAdminArea,
    ViewHistory,
}

impl Capability {
    pub const ALL: [Self; 6] = [
        Self::ChangeStatus,
        Self::Assign,
        Self::ManageRoles,
        Self::ManageSettings,
        Self::AccessAdminArea,
        Self::ViewHistory,
    ];

    #[must_use]
    pub const fn allows(self, role: Role) -> bool {
        match self {
            Self::ChangeStatus => can_change_status(role),
            Self::Assign => can_assign(role),
            Self::ManageRoles => can_manage_roles(role),
            Self::ManageSettings => can_manage_settings(role),
            Self::AccessAdminArea => can_access_admin_area(role),
            Self::ViewHistory => can_view_history(role),
        }
    }

    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::ChangeStatus => "change ticket status",
            Self::Assign => "assign tickets",
            Self::ManageRoles => "manage roles",
            Self::ManageSettings => "manage settings",
            Self::AccessAdminArea => "access the admin area",
            Self::ViewHistory => "view ticket history",
        }
    }
}

/// Fail with `PermissionDenied` unless `role` holds `capability`.
///
/// # Errors
///
/// Returns `DeskError::PermissionDenied` naming the capability.
pub fn authorize(role: Role, capability: Capability) -> Result<()> {
    if capability.allows(role) {
        Ok(())
    } else {
        Err(DeskError::permission(capability.describe(), role))
    }
}

/// Restriction applied to the ticket collection before it reaches a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    /// Only tickets this profile requested.
    Requester(String),
    /// Only tickets in this category.
    Category(Category),
    /// Everything.
    All,
}

impl Visibility {
    #[must_use]
    pub fn for_actor(role: Role, profile_id: &str) -> Self {
        match role {
            Role::Admin => Self::All,
            Role::User => Self::Requester(profile_id.to_string()),
            Role::ItAdmin | Role::MaintenanceAdmin | Role::HousekeepingAdmin => {
                role.category().map_or_else(
                    || Self::Requester(profile_id.to_string()),
                    Self::Category,
                )
            }
        }
    }

    /// In-memory mirror of the storage predicate.
    #[must_use]
    pub fn permits(&self, ticket: &Ticket) -> bool {
        match self {
            Self::Requester(id) => ticket.requester_id == *id,
            Self::Category(category) => ticket.category == *category,
            Self::All => true,
        }
    }
}
