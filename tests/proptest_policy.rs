//! Property tests for the role policy and ticket lifecycle.

mod common;

use chrono::Utc;
use common::init_test_logging;
use proptest::prelude::*;
use ticket_desk::model::{Category, Role, Status, Ticket};
use ticket_desk::policy::{
    Capability, Visibility, can_access_admin_area, can_assign, can_change_status,
    can_manage_roles, can_manage_settings,
};
use tracing::info;

fn any_role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn any_category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

fn any_status() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ALL.to_vec())
}

fn ticket(category: Category, requester: &str) -> Ticket {
    let now = Utc::now();
    Ticket {
        id: "tk-prop".to_string(),
        title: "Property".to_string(),
        description: None,
        category,
        status: Status::New,
        requester_id: requester.to_string(),
        assignee_id: None,
        created_at: now,
        due_date: None,
        updated_at: now,
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..Default::default()
    })]

    #[test]
    fn proptest_change_status_only_for_admins(role in any_role()) {
        init_test_logging();
        info!("proptest_change_status_only_for_admins: role={role}");

        let privileged = matches!(
            role,
            Role::Admin | Role::ItAdmin | Role::MaintenanceAdmin | Role::HousekeepingAdmin
        );
        prop_assert_eq!(can_change_status(role), privileged);
        prop_assert_eq!(can_assign(role), can_change_status(role));
        prop_assert_eq!(can_access_admin_area(role), privileged);
        prop_assert_eq!(can_manage_roles(role), role == Role::Admin);
        prop_assert_eq!(can_manage_settings(role), role == Role::Admin);
    }

    #[test]
    fn proptest_unknown_role_text_is_least_privilege(raw in "[a-z_ ]{0,24}") {
        init_test_logging();
        let role = Role::parse_lenient(&raw);
        if raw.parse::<Role>().is_err() {
            prop_assert_eq!(role, Role::User);
            for cap in Capability::ALL {
                prop_assert!(!cap.allows(role));
            }
        }
    }

    #[test]
    fn proptest_visibility_matches_role(
        role in any_role(),
        category in any_category(),
        own in any::<bool>(),
    ) {
        init_test_logging();
        let actor = "usr-actor";
        let requester = if own { actor } else { "usr-other" };
        let t = ticket(category, requester);
        let visible = Visibility::for_actor(role, actor).permits(&t);

        let expected = match role {
            Role::User => own,
            Role::Admin => true,
            _ => role.category() == Some(category),
        };
        prop_assert_eq!(visible, expected);
    }

    #[test]
    fn proptest_category_admin_pairing_is_bijective(category in any_category()) {
        prop_assert_eq!(category.admin_role().category(), Some(category));
    }

    #[test]
    fn proptest_advance_never_enters_on_hold(status in any_status()) {
        init_test_logging();
        let next = status.advance();
        prop_assert_ne!(next, Status::OnHold);
        prop_assert_eq!(next.is_terminal(), matches!(status, Status::InProgress | Status::Completed));
        if status.is_terminal() {
            prop_assert_eq!(next, status);
        }
    }

    #[test]
    fn proptest_status_text_round_trips(status in any_status()) {
        let parsed: Status = status.as_str().parse().unwrap();
        prop_assert_eq!(parsed, status);
        let snake: Status = status.as_str().to_lowercase().replace(' ', "_").parse().unwrap();
        prop_assert_eq!(snake, status);
    }
}
