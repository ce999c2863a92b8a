//! Sign-up, bootstrap admin, role administration and settings.

mod common;

use common::fixtures::desk;
use common::test_log;
use serde_json::json;
use ticket_desk::error::{DeskError, ErrorKind};
use ticket_desk::model::Role;
use ticket_desk::service::{profiles, settings};
use ticket_desk::session::{self, IdentityProvider, LocalIdentityProvider, Session};

#[test]
fn first_profile_becomes_admin_even_when_asking_for_user() {
    let _log = test_log("first_profile_becomes_admin_even_when_asking_for_user");
    let mut storage = common::test_db();

    let first = session::register(&mut storage, "first@example.com", "First", Role::User).unwrap();
    assert_eq!(first.role(), Role::Admin);

    let second =
        session::register(&mut storage, "second@example.com", "Second", Role::User).unwrap();
    assert_eq!(second.role(), Role::User);
    assert_eq!(storage.count_admins().unwrap(), 1);
}

#[test]
fn reads_never_promote() {
    let _log = test_log("reads_never_promote");
    let mut storage = common::test_db();
    session::register(&mut storage, "first@example.com", "First", Role::User).unwrap();
    let user = session::register(&mut storage, "u@example.com", "U", Role::User).unwrap();

    for _ in 0..3 {
        let again = session::sign_in(&mut storage, "U@Example.com").unwrap();
        assert_eq!(again.role(), Role::User);
        assert_eq!(again.profile_id(), user.profile_id());
    }
}

#[test]
fn sign_in_requires_an_account() {
    let _log = test_log("sign_in_requires_an_account");
    let mut storage = common::test_db();
    let err = session::sign_in(&mut storage, "nobody@example.com").unwrap_err();
    assert!(matches!(err, DeskError::NotSignedIn { .. }));
    assert_eq!(err.kind(), ErrorKind::Permission);
}

#[test]
fn duplicate_and_malformed_signups_are_rejected() {
    let _log = test_log("duplicate_and_malformed_signups_are_rejected");
    let mut storage = common::test_db();
    session::register(&mut storage, "a@example.com", "A", Role::User).unwrap();

    let err = session::register(&mut storage, "A@example.com", "Again", Role::User).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = session::register(&mut storage, "not-an-email", "B", Role::User).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err =
        session::register(&mut storage, "c@example.com", "C", Role::ItAdmin).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn admin_signup_follows_the_hide_setting() {
    let _log = test_log("admin_signup_follows_the_hide_setting");
    let mut d = desk();

    let open = session::register(&mut d.storage, "boss@example.com", "Boss", Role::Admin).unwrap();
    assert_eq!(open.role(), Role::Admin);

    settings::set(&mut d.storage, &d.admin, "hide_admin_signup", json!(true)).unwrap();
    assert!(!session::admin_signup_open(&d.storage).unwrap());

    let err = session::register(&mut d.storage, "sneaky@example.com", "Sneaky", Role::Admin)
        .unwrap_err();
    assert!(matches!(err, DeskError::PermissionDenied { .. }));
    assert!(d.storage.find_profile_by_email("sneaky@example.com").unwrap().is_none());
}

#[test]
fn settings_writes_are_admin_only_and_typed() {
    let _log = test_log("settings_writes_are_admin_only_and_typed");
    let mut d = desk();

    let err = settings::set(&mut d.storage, &d.it_admin, "hide_admin_signup", json!(true))
        .unwrap_err();
    assert!(matches!(err, DeskError::PermissionDenied { .. }));

    let err = settings::set(&mut d.storage, &d.admin, "hide_admin_signup", json!("yes"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = settings::set(&mut d.storage, &d.admin, "theme", json!("dark")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(settings::get(&d.storage, "hide_admin_signup").unwrap().is_none());
    assert!(!settings::hide_admin_signup(&d.storage).unwrap());
}

#[test]
fn only_admins_manage_roles() {
    let _log = test_log("only_admins_manage_roles");
    let mut d = desk();
    let mut it_admin = d.it_admin.clone();

    let err = profiles::set_role(&mut d.storage, &mut it_admin, "bob@example.com", Role::ItAdmin)
        .unwrap_err();
    assert!(matches!(err, DeskError::PermissionDenied { .. }));

    let mut admin = d.admin.clone();
    let bob = profiles::set_role(&mut d.storage, &mut admin, "bob@example.com", Role::ItAdmin)
        .unwrap();
    assert_eq!(bob.role, Role::ItAdmin);

    let listed = profiles::list(&d.storage, &d.it_admin).unwrap();
    assert_eq!(listed.len(), 6);
    assert!(profiles::list(&d.storage, &d.alice).is_err());
}

#[test]
fn last_admin_cannot_be_demoted() {
    let _log = test_log("last_admin_cannot_be_demoted");
    let mut d = desk();
    let mut admin = d.admin.clone();
    let own_id = admin.profile_id().to_string();

    let err = profiles::set_role(&mut d.storage, &mut admin, &own_id, Role::User).unwrap_err();
    assert!(matches!(err, DeskError::LastAdmin { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(admin.role(), Role::Admin);
    assert_eq!(d.storage.count_admins().unwrap(), 1);
}

#[test]
fn self_demotion_refreshes_the_session() {
    let _log = test_log("self_demotion_refreshes_the_session");
    let mut d = desk();
    let mut admin = d.admin.clone();
    profiles::set_role(&mut d.storage, &mut admin, "alice@example.com", Role::Admin).unwrap();

    let own_id = admin.profile_id().to_string();
    profiles::set_role(&mut d.storage, &mut admin, &own_id, Role::MaintenanceAdmin).unwrap();
    assert_eq!(admin.role(), Role::MaintenanceAdmin);

    let err = profiles::set_role(&mut d.storage, &mut admin, &own_id, Role::Admin).unwrap_err();
    assert!(matches!(err, DeskError::PermissionDenied { .. }));
}

#[test]
fn local_provider_tracks_the_current_identity() {
    let _log = test_log("local_provider_tracks_the_current_identity");
    let mut storage = common::test_db();
    let mut provider = LocalIdentityProvider::new(&mut storage);

    let identity = provider.sign_up("new@example.com", "New Person").unwrap();
    assert_eq!(provider.current(), Some(identity.user_id.as_str()));
    provider.sign_out();
    assert!(provider.current().is_none());

    let again = provider.authenticate("new@example.com").unwrap();
    assert_eq!(again, identity);

    let session = Session::establish(&mut storage, &identity).unwrap();
    assert_eq!(session.role(), Role::Admin);
}
