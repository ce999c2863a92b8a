//! New-ticket notifications for category admins.
//!
//! Dispatch is best effort. It reports per-recipient outcomes and never
//! returns an error to the code that created the ticket.

use crate::error::{DeskError, Result};
use crate::model::Ticket;
use crate::storage::SqliteStorage;
use crate::util::escape_html;
use crate::validation::is_valid_email;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::thread;
use tracing::{debug, info, warn};

/// One outgoing email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Something that can deliver an email.
///
/// Implementations are shared across the dispatch threads.
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::Mail` (or an I/O error) if delivery failed.
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Writes each message as a JSON file into a spool directory.
#[derive(Debug, Clone)]
pub struct OutboxMailer {
    dir: PathBuf,
    from: String,
}

#[derive(Serialize)]
struct SpooledMessage<'a> {
    from: &'a str,
    #[serde(flatten)]
    message: &'a EmailMessage,
    queued_at: String,
}

impl OutboxMailer {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, from: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            from: from.into(),
        }
    }

    #[must_use]
    pub const fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let now = Utc::now();
        let stem = crate::util::id::compute_id_hash(
            &format!("{}|{}|{}", message.to, message.subject, now.timestamp_nanos_opt().unwrap_or(0)),
            12,
        );
        let path = self
            .dir
            .join(format!("{}-{stem}.json", now.format("%Y%m%dT%H%M%S")));
        let spooled = SpooledMessage {
            from: &self.from,
            message,
            queued_at: now.to_rfc3339(),
        };
        fs::write(&path, serde_json::to_vec_pretty(&spooled)?).map_err(|e| DeskError::Mail {
            recipient: message.to.clone(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), to = %message.to, "Spooled message");
        Ok(())
    }
}

/// Only logs messages. Useful when no outbox is wanted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(to = %message.to, subject = %message.subject, "Email (log only)");
        Ok(())
    }
}

/// A recipient that could not be notified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRecipient {
    pub email: String,
    pub error: String,
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedRecipient>,
    /// Set when recipients could not be resolved at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DispatchReport {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.error.is_none()
    }
}

/// Build the new-ticket email for one recipient.
#[must_use]
pub fn new_ticket_message(to: &str, ticket: &Ticket, requester_name: &str) -> EmailMessage {
    let description = ticket.description.as_deref().unwrap_or("(none)");
    let html = format!(
        "<h2>New Ticket Created</h2>\n\
         <p><strong>Ticket:</strong> {id}</p>\n\
         <p><strong>Category:</strong> {category}</p>\n\
         <p><strong>Title:</strong> {title}</p>\n\
         <p><strong>Description:</strong> {description}</p>\n\
         <p><strong>Requester:</strong> {requester}</p>\n\
         <p><strong>Date Created:</strong> {created}</p>\n\
         <p>Please review and assign this ticket as needed.</p>\n",
        id = escape_html(&ticket.id),
        category = ticket.category,
        title = escape_html(&ticket.title),
        description = escape_html(description),
        requester = escape_html(requester_name),
        created = ticket.created_at.format("%Y-%m-%d %H:%M UTC"),
    );
    EmailMessage {
        to: to.to_string(),
        subject: format!("New {} Ticket: {}", ticket.category, ticket.title),
        html,
    }
}

fn deliver(mailer: &dyn Mailer, message: &EmailMessage) -> std::result::Result<(), String> {
    if !is_valid_email(&message.to) {
        return Err(format!("invalid recipient address '{}'", message.to));
    }
    mailer.send(message).map_err(|e| e.to_string())
}

/// Notify every admin paired with the ticket's category.
///
/// Sends run concurrently, one thread per recipient; the report lists
/// recipients in lookup order. No matching admins is an empty, clean report.
pub fn dispatch_new_ticket(
    storage: &SqliteStorage,
    mailer: &dyn Mailer,
    ticket: &Ticket,
    requester_name: &str,
) -> DispatchReport {
    let role = ticket.category.admin_role();
    let admins = match storage.profiles_with_role(role) {
        Ok(admins) => admins,
        Err(e) => {
            warn!(ticket = %ticket.id, error = %e, "Could not resolve notification recipients");
            return DispatchReport {
                error: Some(e.to_string()),
                ..DispatchReport::default()
            };
        }
    };

    if admins.is_empty() {
        debug!(ticket = %ticket.id, %role, "No admins to notify");
        return DispatchReport::default();
    }

    let messages: Vec<EmailMessage> = admins
        .iter()
        .map(|admin| new_ticket_message(&admin.email, ticket, requester_name))
        .collect();

    let outcomes: Vec<std::result::Result<(), String>> = thread::scope(|scope| {
        let handles: Vec<_> = messages
            .iter()
            .map(|message| scope.spawn(move || deliver(mailer, message)))
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err("mail sender panicked".to_string()))
            })
            .collect()
    });

    let mut report = DispatchReport::default();
    for (message, outcome) in messages.into_iter().zip(outcomes) {
        match outcome {
            Ok(()) => report.succeeded.push(message.to),
            Err(error) => {
                warn!(ticket = %ticket.id, to = %message.to, %error, "Notification failed");
                report.failed.push(FailedRecipient {
                    email: message.to,
                    error,
                });
            }
        }
    }

    info!(
        ticket = %ticket.id,
        sent = report.succeeded.len(),
        failed = report.failed.len(),
        "Notified category admins"
    );
    report
}
