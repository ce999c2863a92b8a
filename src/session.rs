//! Identity and the per-caller session.
//!
//! A [`Session`] is passed explicitly to every operation that needs to know
//! who is acting. It caches the caller's profile, which must be re-read with
//! [`Session::refresh`] after the caller's own role changes.

use crate::error::{DeskError, Result};
use crate::model::{Profile, Role};
use crate::policy::Visibility;
use crate::storage::SqliteStorage;
use crate::validation::ProfileValidator;
use tracing::{debug, info};

/// What the identity provider vouches for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
}

/// Source of authenticated identities.
pub trait IdentityProvider {
    /// Resolve an existing identity.
    ///
    /// # Errors
    ///
    /// Returns `NotSignedIn` if the identity is unknown.
    fn authenticate(&mut self, email: &str) -> Result<Identity>;

    /// Register a new identity.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed input or an already-registered email.
    fn sign_up(&mut self, email: &str, display_name: &str) -> Result<Identity>;

    /// End the current identity's session.
    fn sign_out(&mut self);
}

/// Identity provider backed by the local profile table.
///
/// There are no credentials: the configured actor email is trusted.
#[derive(Debug)]
pub struct LocalIdentityProvider<'a> {
    storage: &'a mut SqliteStorage,
    requested_role: Role,
    current: Option<String>,
}

impl<'a> LocalIdentityProvider<'a> {
    #[must_use]
    pub fn new(storage: &'a mut SqliteStorage) -> Self {
        Self {
            storage,
            requested_role: Role::User,
            current: None,
        }
    }

    /// Role the next `sign_up` asks for.
    #[must_use]
    pub fn requesting(mut self, role: Role) -> Self {
        self.requested_role = role;
        self
    }

    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

impl IdentityProvider for LocalIdentityProvider<'_> {
    fn authenticate(&mut self, email: &str) -> Result<Identity> {
        let profile = self
            .storage
            .find_profile_by_email(email)?
            .ok_or_else(|| DeskError::NotSignedIn {
                reason: format!("no account for '{}'", email.trim()),
            })?;
        self.current = Some(profile.id.clone());
        Ok(identity_of(&profile))
    }

    fn sign_up(&mut self, email: &str, display_name: &str) -> Result<Identity> {
        ProfileValidator::validate(email, display_name).map_err(DeskError::from_validation_errors)?;

        if self.storage.find_profile_by_email(email)?.is_some() {
            return Err(DeskError::validation("email", "is already registered"));
        }

        let (profile, _) =
            self.storage
                .ensure_profile(email, display_name, self.requested_role)?;
        info!(id = %profile.id, role = %profile.role, "Signed up");
        self.current = Some(profile.id.clone());
        Ok(identity_of(&profile))
    }

    fn sign_out(&mut self) {
        if let Some(id) = self.current.take() {
            debug!(%id, "Signed out");
        }
    }
}

fn identity_of(profile: &Profile) -> Identity {
    Identity {
        user_id: profile.id.clone(),
        email: profile.email.clone(),
        display_name: profile.full_name.clone(),
    }
}

/// Whether admin self-signup is currently offered.
///
/// # Errors
///
/// Returns an error if the setting cannot be read.
pub fn admin_signup_open(storage: &SqliteStorage) -> Result<bool> {
    Ok(!crate::service::settings::hide_admin_signup(storage)?)
}

/// Register a new account, optionally asking for the admin role.
///
/// Asking for `Admin` is refused once admin signup is hidden. The very
/// first account becomes `Admin` regardless of what was asked.
///
/// # Errors
///
/// Returns `PermissionDenied` for a refused admin request, or any sign-up error.
pub fn register(
    storage: &mut SqliteStorage,
    email: &str,
    display_name: &str,
    requested: Role,
) -> Result<Session> {
    if requested == Role::Admin && !admin_signup_open(storage)? {
        return Err(DeskError::permission("sign up as admin", Role::User));
    }
    if !matches!(requested, Role::User | Role::Admin) {
        return Err(DeskError::validation(
            "role",
            "sign-up may only request 'user' or 'admin'",
        ));
    }

    let identity = LocalIdentityProvider::new(storage)
        .requesting(requested)
        .sign_up(email, display_name)?;
    Session::establish(storage, &identity)
}

/// Resolve `email` through the local provider and open a session.
///
/// # Errors
///
/// Returns `NotSignedIn` if no account exists for `email`.
pub fn sign_in(storage: &mut SqliteStorage, email: &str) -> Result<Session> {
    let identity = LocalIdentityProvider::new(storage).authenticate(email)?;
    Session::establish(storage, &identity)
}

/// The acting caller: an authenticated profile with its cached role.
#[derive(Debug, Clone)]
pub struct Session {
    profile: Profile,
}

impl Session {
    /// Load the profile for `identity`, creating it if absent.
    ///
    /// A created profile is keyed by `identity.user_id`, so the two ids
    /// always agree. Creation goes through the bootstrap rule; reads never
    /// promote.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be read or created, or if the
    /// identity's email already belongs to another profile.
    pub fn establish(storage: &mut SqliteStorage, identity: &Identity) -> Result<Self> {
        if let Some(profile) = storage.get_profile(&identity.user_id)? {
            return Ok(Self { profile });
        }
        let (profile, created) = storage.ensure_profile_with_id(
            &identity.user_id,
            &identity.email,
            &identity.display_name,
            Role::User,
        )?;
        if created {
            info!(id = %profile.id, role = %profile.role, "Created profile on first sign-in");
        }
        Ok(Self { profile })
    }

    /// Wrap an already-loaded profile.
    #[must_use]
    pub const fn from_profile(profile: Profile) -> Self {
        Self { profile }
    }

    /// Re-read the cached profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileNotFound` if the profile has vanished, or a database error.
    pub fn refresh(&mut self, storage: &SqliteStorage) -> Result<()> {
        self.profile = storage
            .get_profile(&self.profile.id)?
            .ok_or_else(|| DeskError::ProfileNotFound {
                id: self.profile.id.clone(),
            })?;
        debug!(id = %self.profile.id, role = %self.profile.role, "Session refreshed");
        Ok(())
    }

    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    #[must_use]
    pub fn profile_id(&self) -> &str {
        &self.profile.id
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.profile.role
    }

    #[must_use]
    pub fn visibility(&self) -> Visibility {
        Visibility::for_actor(self.profile.role, &self.profile.id)
    }
}
