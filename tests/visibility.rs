//! Role-scoped reads: lists, history, single-ticket views.

mod common;

use chrono::{Duration, Utc};
use common::fixtures::{Desk, desk, open_ticket};
use common::test_log;
use ticket_desk::error::DeskError;
use ticket_desk::model::{Category, Status};
use ticket_desk::service::tickets;
use ticket_desk::storage::TicketFilters;

/// Alice opens one ticket per category, Bob opens one IT ticket.
fn seeded() -> Desk {
    let mut d = desk();
    open_ticket(&mut d.storage, &d.alice, "Alice IT", "IT");
    open_ticket(&mut d.storage, &d.alice, "Alice Maintenance", "Maintenance");
    open_ticket(&mut d.storage, &d.alice, "Alice Housekeeping", "Housekeeping");
    open_ticket(&mut d.storage, &d.bob, "Bob IT", "IT");
    d
}

#[test]
fn user_sees_only_own_tickets() {
    let _log = test_log("user_sees_only_own_tickets");
    let d = seeded();

    let alice = tickets::list(&d.storage, &d.alice, &TicketFilters::default()).unwrap();
    assert_eq!(alice.len(), 3);
    assert!(alice.iter().all(|t| t.ticket.requester_id == d.alice.profile_id()));

    let bob = tickets::list(&d.storage, &d.bob, &TicketFilters::default()).unwrap();
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].ticket.title, "Bob IT");
}

#[test]
fn category_admins_see_their_category_regardless_of_requester() {
    let _log = test_log("category_admins_see_their_category_regardless_of_requester");
    let d = seeded();

    for (session, category, expected) in [
        (&d.it_admin, Category::It, 2),
        (&d.maintenance_admin, Category::Maintenance, 1),
        (&d.housekeeping_admin, Category::Housekeeping, 1),
    ] {
        let seen = tickets::list(&d.storage, session, &TicketFilters::default()).unwrap();
        assert_eq!(seen.len(), expected, "{category}");
        assert!(seen.iter().all(|t| t.ticket.category == category));
    }
}

#[test]
fn admin_sees_everything_newest_first() {
    let _log = test_log("admin_sees_everything_newest_first");
    let d = seeded();
    let all = tickets::list(&d.storage, &d.admin, &TicketFilters::default()).unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].ticket.title, "Bob IT");
    assert!(
        all.windows(2)
            .all(|pair| pair[0].ticket.created_at >= pair[1].ticket.created_at)
    );
}

#[test]
fn filters_narrow_but_never_widen() {
    let _log = test_log("filters_narrow_but_never_widen");
    let d = seeded();

    let maint_filter = TicketFilters {
        category: Some(Category::Maintenance),
        ..TicketFilters::default()
    };
    let it_admin_maint = tickets::list(&d.storage, &d.it_admin, &maint_filter).unwrap();
    assert!(it_admin_maint.is_empty());

    let search_bob = TicketFilters {
        search: Some("bob".to_string()),
        ..TicketFilters::default()
    };
    assert!(tickets::list(&d.storage, &d.alice, &search_bob).unwrap().is_empty());
    let admin_bob = tickets::list(&d.storage, &d.admin, &search_bob).unwrap();
    assert_eq!(admin_bob.len(), 1);

    let by_requester_name = TicketFilters {
        search: Some("alice requester".to_string()),
        ..TicketFilters::default()
    };
    let it_alice = tickets::list(&d.storage, &d.it_admin, &by_requester_name).unwrap();
    assert_eq!(it_alice.len(), 1);
    assert_eq!(it_alice[0].ticket.title, "Alice IT");

    let completed_only = TicketFilters {
        status: Some(Status::Completed),
        ..TicketFilters::default()
    };
    assert!(tickets::list(&d.storage, &d.admin, &completed_only).unwrap().is_empty());
}

#[test]
fn search_is_case_insensitive_beyond_ascii() {
    let _log = test_log("search_is_case_insensitive_beyond_ascii");
    let mut d = seeded();
    open_ticket(&mut d.storage, &d.alice, "Ölheizung defekt", "Maintenance");

    let filters = TicketFilters {
        search: Some("ölheizung".to_string()),
        ..TicketFilters::default()
    };
    let hits = tickets::list(&d.storage, &d.maintenance_admin, &filters).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].ticket.title, "Ölheizung defekt");

    let bob_hits = tickets::list(&d.storage, &d.bob, &filters).unwrap();
    assert!(bob_hits.is_empty());
}

#[test]
fn out_of_scope_ticket_reads_as_not_found() {
    let _log = test_log("out_of_scope_ticket_reads_as_not_found");
    let mut d = desk();
    let bobs = open_ticket(&mut d.storage, &d.bob, "Bob private", "Housekeeping");

    let err = tickets::show(&d.storage, &d.alice, &bobs.id).unwrap_err();
    assert!(matches!(err, DeskError::TicketNotFound { .. }));

    let err = tickets::show(&d.storage, &d.it_admin, &bobs.id).unwrap_err();
    assert!(matches!(err, DeskError::TicketNotFound { .. }));

    let err = tickets::change_status(&mut d.storage, &d.it_admin, &bobs.id, Status::Completed)
        .unwrap_err();
    assert!(matches!(err, DeskError::TicketNotFound { .. }));
    assert_eq!(
        d.storage.get_ticket(&bobs.id).unwrap().unwrap().status,
        Status::New
    );

    assert!(tickets::show(&d.storage, &d.housekeeping_admin, &bobs.id).is_ok());
    assert!(tickets::show(&d.storage, &d.bob, &bobs.id).is_ok());
}

#[test]
fn history_is_admin_area_and_range_bounded() {
    let _log = test_log("history_is_admin_area_and_range_bounded");
    let d = seeded();
    let now = Utc::now();

    let err = tickets::history(&d.storage, &d.alice, None, None, &TicketFilters::default())
        .unwrap_err();
    assert!(matches!(err, DeskError::PermissionDenied { .. }));

    let recent = tickets::history(
        &d.storage,
        &d.it_admin,
        Some(now - Duration::hours(1)),
        Some(now + Duration::hours(1)),
        &TicketFilters::default(),
    )
    .unwrap();
    assert_eq!(recent.len(), 2);

    let future = tickets::history(
        &d.storage,
        &d.admin,
        Some(now + Duration::days(1)),
        None,
        &TicketFilters::default(),
    )
    .unwrap();
    assert!(future.is_empty());

    let err = tickets::history(
        &d.storage,
        &d.admin,
        Some(now),
        Some(now - Duration::days(1)),
        &TicketFilters::default(),
    )
    .unwrap_err();
    assert!(matches!(err, DeskError::Validation { .. }));
}
