//! Ticket operations, each authorized against the acting session.

use crate::error::{DeskError, Result};
use crate::model::{Status, Ticket, TicketDetails, TicketStats};
use crate::notify::{DispatchReport, Mailer, dispatch_new_ticket};
use crate::policy::{Capability, authorize};
use crate::session::Session;
use crate::storage::{SqliteStorage, TicketFilters, TicketUpdate};
use crate::util::{TICKET_PREFIX, normalize_id};
use crate::validation::{TicketInput, TicketValidator};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Input for a new ticket.
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    /// Raw category text; parsed during validation.
    pub category: String,
    pub due_date: Option<DateTime<Utc>>,
}

/// A stored ticket plus what happened to its notifications.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedTicket {
    pub ticket: Ticket,
    pub notifications: DispatchReport,
}

/// Open a ticket on behalf of the session's profile.
///
/// Category admins are notified afterwards. Notification problems are
/// logged and reported but never fail the call.
///
/// # Errors
///
/// Returns a validation error for bad input (nothing is stored), or a
/// database error if the insert fails.
pub fn create(
    storage: &mut SqliteStorage,
    session: &Session,
    input: &NewTicket,
    mailer: &dyn Mailer,
) -> Result<CreatedTicket> {
    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let category = TicketValidator::validate(&TicketInput {
        title: &input.title,
        description,
        category: &input.category,
    })
    .map_err(DeskError::from_validation_errors)?;

    let now = Utc::now();
    let draft = Ticket {
        id: String::new(),
        title: input.title.trim().to_string(),
        description: description.map(str::to_string),
        category,
        status: Status::New,
        requester_id: session.profile_id().to_string(),
        assignee_id: None,
        created_at: now,
        due_date: input.due_date,
        updated_at: now,
    };

    let ticket = storage.create_ticket(&draft)?;
    info!(id = %ticket.id, %category, requester = %ticket.requester_id, "Created ticket");

    let notifications =
        dispatch_new_ticket(storage, mailer, &ticket, &session.profile().full_name);
    if !notifications.is_clean() {
        warn!(
            id = %ticket.id,
            failed = notifications.failed.len(),
            "Some admins were not notified"
        );
    }

    Ok(CreatedTicket {
        ticket,
        notifications,
    })
}

/// Load a ticket the session is allowed to see.
///
/// Tickets outside the caller's visibility are reported as missing.
fn load_visible(storage: &SqliteStorage, session: &Session, id: &str) -> Result<TicketDetails> {
    let id = normalize_id(id, TICKET_PREFIX);
    storage
        .get_ticket_details(&id)?
        .filter(|details| session.visibility().permits(&details.ticket))
        .ok_or(DeskError::TicketNotFound { id })
}

/// Show one ticket with its requester and assignee.
///
/// # Errors
///
/// Returns `TicketNotFound` if it does not exist or is not visible to the caller.
pub fn show(storage: &SqliteStorage, session: &Session, id: &str) -> Result<TicketDetails> {
    load_visible(storage, session, id)
}

/// Set a ticket's status directly. Any of the four statuses is allowed.
///
/// Setting the current status again is a no-op.
///
/// # Errors
///
/// Returns `PermissionDenied` for roles that cannot change status (checked
/// first, nothing is read or written), `TicketNotFound`, or a database error.
pub fn change_status(
    storage: &mut SqliteStorage,
    session: &Session,
    id: &str,
    status: Status,
) -> Result<Ticket> {
    authorize(session.role(), Capability::ChangeStatus)?;
    let current = load_visible(storage, session, id)?.ticket;

    if current.status == status {
        return Ok(current);
    }

    let ticket = storage.update_ticket(
        &current.id,
        &TicketUpdate {
            status: Some(status),
            ..TicketUpdate::default()
        },
    )?;
    info!(id = %ticket.id, from = %current.status, to = %status, "Status changed");
    Ok(ticket)
}

/// Move a ticket to its suggested next status.
///
/// # Errors
///
/// Same as [`change_status`].
pub fn advance(storage: &mut SqliteStorage, session: &Session, id: &str) -> Result<Ticket> {
    authorize(session.role(), Capability::ChangeStatus)?;
    let current = load_visible(storage, session, id)?.ticket;
    change_status(storage, session, &current.id, current.status.advance())
}

/// Assign a ticket to a profile (id or email), or clear it with `None`.
///
/// # Errors
///
/// Returns `PermissionDenied`, `TicketNotFound`, `ProfileNotFound` for an
/// unknown assignee, or a database error.
pub fn assign(
    storage: &mut SqliteStorage,
    session: &Session,
    id: &str,
    assignee: Option<&str>,
) -> Result<Ticket> {
    authorize(session.role(), Capability::Assign)?;
    let current = load_visible(storage, session, id)?.ticket;

    let assignee_id = match assignee {
        Some(key) => Some(super::profiles::resolve(storage, key)?.id),
        None => None,
    };

    let ticket = storage.update_ticket(
        &current.id,
        &TicketUpdate {
            assignee: Some(assignee_id),
            ..TicketUpdate::default()
        },
    )?;
    info!(
        id = %ticket.id,
        assignee = ticket.assignee_id.as_deref().unwrap_or("-"),
        "Assignment changed"
    );
    Ok(ticket)
}

/// Tickets visible to the session, narrowed by `filters`, newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub fn list(
    storage: &SqliteStorage,
    session: &Session,
    filters: &TicketFilters,
) -> Result<Vec<TicketDetails>> {
    storage.list_tickets(&session.visibility(), filters)
}

/// Visible tickets created within `[from, to]`.
///
/// # Errors
///
/// Returns `PermissionDenied` for plain users, a validation error when
/// `from` is after `to`, or a database error.
pub fn history(
    storage: &SqliteStorage,
    session: &Session,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    filters: &TicketFilters,
) -> Result<Vec<TicketDetails>> {
    authorize(session.role(), Capability::ViewHistory)?;
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            return Err(DeskError::validation("from", "is after 'to'"));
        }
    }
    let ranged = TicketFilters {
        created_from: from.or(filters.created_from),
        created_to: to.or(filters.created_to),
        ..filters.clone()
    };
    list(storage, session, &ranged)
}

/// Status counts over the visible, filtered tickets.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub fn stats(
    storage: &SqliteStorage,
    session: &Session,
    filters: &TicketFilters,
) -> Result<TicketStats> {
    let tickets = list(
        storage,
        session,
        &TicketFilters {
            limit: None,
            ..filters.clone()
        },
    )?;
    Ok(TicketStats::from_tickets(tickets.iter().map(|d| &d.ticket)))
}
