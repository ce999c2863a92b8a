//! End-to-end runs of the `td` binary.

mod common;

use common::cli::{TdWorkspace, run_td, run_td_with_env};
use common::init_test_logging;

fn setup_desk(ws: &TdWorkspace) {
    let init = run_td(ws, ["init"], "init");
    assert!(init.status.success(), "init failed: {}", init.stderr);

    for (email, name) in [
        ("root@example.com", "Root Admin"),
        ("it@example.com", "Ivy Tech"),
        ("maint@example.com", "Max Wrench"),
        ("alice@example.com", "Alice Requester"),
    ] {
        let run = run_td(ws, ["signup", email, "--name", name], &format!("signup_{name}"));
        assert!(run.status.success(), "signup {email} failed: {}", run.stderr);
    }

    for (email, role) in [
        ("it@example.com", "it_admin"),
        ("maint@example.com", "maintenance_admin"),
    ] {
        let run = run_td(
            ws,
            ["role", email, role, "--as", "root@example.com"],
            &format!("role_{role}"),
        );
        assert!(run.status.success(), "role {email} failed: {}", run.stderr);
    }
}

#[test]
fn e2e_first_signup_is_bootstrapped_admin() {
    init_test_logging();
    let ws = TdWorkspace::new();
    assert!(run_td(&ws, ["init"], "init").status.success());

    let first = run_td(
        &ws,
        ["signup", "first@example.com", "--name", "First", "--json"],
        "signup_first",
    );
    assert!(first.status.success(), "{}", first.stderr);
    let json = first.json();
    assert_eq!(json["role"], "admin");
    assert_eq!(json["bootstrapped"], true);

    let second = run_td(
        &ws,
        ["signup", "second@example.com", "--name", "Second", "--json"],
        "signup_second",
    );
    assert_eq!(second.json()["role"], "user");
}

#[test]
fn e2e_ticket_flow_with_roles() {
    init_test_logging();
    let ws = TdWorkspace::new();
    setup_desk(&ws);

    let create = run_td(
        &ws,
        [
            "create",
            "Printer jam",
            "--category",
            "it",
            "--description",
            "Paper stuck in tray 2",
            "--as",
            "alice@example.com",
            "--json",
        ],
        "create",
    );
    assert!(create.status.success(), "{}", create.stderr);
    let created = create.json();
    assert_eq!(created["ticket"]["status"], "New");
    assert_eq!(created["ticket"]["category"], "IT");
    assert_eq!(
        created["notifications"]["succeeded"],
        serde_json::json!(["it@example.com"])
    );
    let id = created["ticket"]["id"].as_str().unwrap().to_string();
    assert_eq!(ws.outbox_files().len(), 1);

    let denied = run_td(
        &ws,
        ["status", id.as_str(), "completed", "--as", "alice@example.com"],
        "status_denied",
    );
    assert_eq!(denied.code(), Some(5));
    assert_eq!(denied.error_code(), "PERMISSION_DENIED");

    let hidden = run_td(
        &ws,
        ["show", id.as_str(), "--as", "maint@example.com"],
        "show_hidden",
    );
    assert_eq!(hidden.code(), Some(3));
    assert_eq!(hidden.error_code(), "TICKET_NOT_FOUND");

    let advance = run_td(
        &ws,
        ["advance", id.as_str(), "--as", "it@example.com", "--json"],
        "advance",
    );
    assert!(advance.status.success(), "{}", advance.stderr);
    assert_eq!(advance.json()["status"], "In Progress");

    let assign = run_td(
        &ws,
        ["assign", id.as_str(), "it@example.com", "--as", "root@example.com", "--json"],
        "assign",
    );
    assert!(assign.status.success(), "{}", assign.stderr);
    assert!(assign.json()["assignee_id"].as_str().unwrap().starts_with("usr-"));

    let it_list = run_td(&ws, ["list", "--as", "it@example.com", "--json"], "list_it");
    assert_eq!(it_list.json().as_array().unwrap().len(), 1);
    let maint_list = run_td(&ws, ["list", "--as", "maint@example.com", "--json"], "list_maint");
    assert!(maint_list.json().as_array().unwrap().is_empty());

    for _ in 0..2 {
        let done = run_td(
            &ws,
            ["status", id.as_str(), "Completed", "--as", "root@example.com", "--json"],
            "status_completed",
        );
        assert!(done.status.success(), "{}", done.stderr);
        assert_eq!(done.json()["status"], "Completed");
    }

    let stats = run_td(&ws, ["stats", "--as", "alice@example.com", "--json"], "stats");
    let stats = stats.json();
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["completed"], 1);
}

#[test]
fn e2e_validation_and_history_errors() {
    init_test_logging();
    let ws = TdWorkspace::new();
    setup_desk(&ws);

    let blank = run_td(
        &ws,
        ["create", "   ", "-c", "IT", "--as", "alice@example.com"],
        "create_blank",
    );
    assert_eq!(blank.code(), Some(4));

    let bad_category = run_td(
        &ws,
        ["create", "Leak", "-c", "Plumbing", "--as", "alice@example.com"],
        "create_bad_category",
    );
    assert_eq!(bad_category.code(), Some(4));

    let list = run_td(&ws, ["list", "--as", "root@example.com", "--json"], "list_empty");
    assert!(list.json().as_array().unwrap().is_empty());
    assert!(ws.outbox_files().is_empty());

    let history_user = run_td(
        &ws,
        ["history", "--as", "alice@example.com"],
        "history_user",
    );
    assert_eq!(history_user.code(), Some(5));

    let history_admin = run_td(
        &ws,
        [
            "history",
            "--from",
            "2000-01-01",
            "--to",
            "tomorrow",
            "--as",
            "it@example.com",
            "--json",
        ],
        "history_admin",
    );
    assert!(history_admin.status.success(), "{}", history_admin.stderr);
    assert_eq!(history_admin.json()["count"], 0);

    let demote = run_td(
        &ws,
        ["role", "root@example.com", "user", "--as", "root@example.com"],
        "demote_last_admin",
    );
    assert_eq!(demote.code(), Some(4));
    assert_eq!(demote.error_code(), "LAST_ADMIN");
}

#[test]
fn e2e_actor_resolution() {
    init_test_logging();
    let ws = TdWorkspace::new();
    setup_desk(&ws);

    let missing = run_td(&ws, ["whoami"], "whoami_missing");
    assert_eq!(missing.code(), Some(5));
    assert_eq!(missing.error_code(), "NOT_SIGNED_IN");

    let from_env = run_td_with_env(
        &ws,
        ["whoami", "--json"],
        [("TD_ACTOR", "it@example.com")],
        "whoami_env",
    );
    assert!(from_env.status.success(), "{}", from_env.stderr);
    assert_eq!(from_env.json()["role"], "it_admin");

    let flag_wins = run_td_with_env(
        &ws,
        ["whoami", "--json", "--as", "alice@example.com"],
        [("TD_ACTOR", "it@example.com")],
        "whoami_flag",
    );
    assert_eq!(flag_wins.json()["role"], "user");
}

#[test]
fn e2e_settings_gate_admin_signup() {
    init_test_logging();
    let ws = TdWorkspace::new();
    setup_desk(&ws);

    let set = run_td(
        &ws,
        ["settings", "set", "hide_admin_signup", "true", "--as", "root@example.com", "--json"],
        "settings_set",
    );
    assert!(set.status.success(), "{}", set.stderr);
    assert_eq!(set.json()["value"], true);

    let get = run_td(&ws, ["settings", "get", "hide_admin_signup", "--json"], "settings_get");
    assert_eq!(get.json()["value"], true);

    let refused = run_td(
        &ws,
        ["signup", "boss@example.com", "--name", "Boss", "--admin"],
        "signup_admin_hidden",
    );
    assert_eq!(refused.code(), Some(5));
}

#[test]
fn e2e_outside_a_desk() {
    init_test_logging();
    let ws = TdWorkspace::new();
    let run = run_td(&ws, ["list", "--as", "a@example.com"], "list_no_desk");
    assert_eq!(run.code(), Some(2));
    assert_eq!(run.error_code(), "NOT_INITIALIZED");
}

#[test]
fn e2e_completions() {
    init_test_logging();
    let ws = TdWorkspace::new();
    let run = run_td(&ws, ["completions", "bash"], "completions");
    assert!(run.status.success());
    assert!(run.stdout.contains("td"));
    assert!(run.stdout.contains("signup"));
}
