#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use ticket_desk::error::{DeskError, Result};
use ticket_desk::model::{Role, Ticket};
use ticket_desk::notify::{EmailMessage, Mailer};
use ticket_desk::service::tickets::{self, NewTicket};
use ticket_desk::session::Session;
use ticket_desk::storage::SqliteStorage;

/// Mailer that remembers what it sent and fails for chosen recipients.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail_for: HashSet<String>,
}

impl RecordingMailer {
    pub fn failing_for(emails: &[&str]) -> Self {
        Self {
            sent: Mutex::default(),
            fail_for: emails.iter().map(|e| (*e).to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("lock").clone()
    }

    pub fn recipients(&self) -> HashSet<String> {
        self.sent().into_iter().map(|m| m.to).collect()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.fail_for.contains(&message.to) {
            return Err(DeskError::Mail {
                recipient: message.to.clone(),
                reason: "mailbox unavailable".to_string(),
            });
        }
        self.sent.lock().expect("lock").push(message.clone());
        Ok(())
    }
}

/// The people most scenarios need. `admin` is created first, so it is the
/// bootstrap admin.
pub struct Desk {
    pub storage: SqliteStorage,
    pub admin: Session,
    pub it_admin: Session,
    pub maintenance_admin: Session,
    pub housekeeping_admin: Session,
    pub alice: Session,
    pub bob: Session,
}

/// Create a profile holding `role`, going through the normal bootstrap path.
pub fn profile(storage: &mut SqliteStorage, email: &str, name: &str, role: Role) -> Session {
    let (created, _) = storage
        .ensure_profile(email, name, Role::User)
        .expect("ensure profile");
    let profile = if created.role == role {
        created
    } else {
        storage.set_role(&created.id, role).expect("set role")
    };
    Session::from_profile(profile)
}

pub fn desk() -> Desk {
    let mut storage = super::test_db();
    let admin = profile(&mut storage, "root@example.com", "Root Admin", Role::Admin);
    let it_admin = profile(&mut storage, "it@example.com", "Ivy Tech", Role::ItAdmin);
    let maintenance_admin = profile(
        &mut storage,
        "maint@example.com",
        "Max Wrench",
        Role::MaintenanceAdmin,
    );
    let housekeeping_admin = profile(
        &mut storage,
        "house@example.com",
        "Hana Broom",
        Role::HousekeepingAdmin,
    );
    let alice = profile(&mut storage, "alice@example.com", "Alice Requester", Role::User);
    let bob = profile(&mut storage, "bob@example.com", "Bob Requester", Role::User);
    Desk {
        storage,
        admin,
        it_admin,
        maintenance_admin,
        housekeeping_admin,
        alice,
        bob,
    }
}

pub fn new_ticket(title: &str, category: &str) -> NewTicket {
    NewTicket {
        title: title.to_string(),
        description: Some(format!("{title} details")),
        category: category.to_string(),
        due_date: None,
    }
}

/// Open a ticket as `session`, discarding notifications.
pub fn open_ticket(
    storage: &mut SqliteStorage,
    session: &Session,
    title: &str,
    category: &str,
) -> Ticket {
    let mailer = RecordingMailer::default();
    tickets::create(storage, session, &new_ticket(title, category), &mailer)
        .expect("create ticket")
        .ticket
}
