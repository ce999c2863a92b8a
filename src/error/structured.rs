//! Structured error output for scripted callers.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging
//!
//! Intent detection recognizes common spellings ("done", "wip", "it")
//! and points at the canonical value.

#![allow(clippy::option_if_let_else, clippy::manual_map)]

use crate::error::{DeskError, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Store Errors (exit code 2) ===
    DatabaseNotFound,
    DatabaseError,
    NotInitialized,
    AlreadyInitialized,

    // === Lookup Errors (exit code 3) ===
    TicketNotFound,
    ProfileNotFound,

    // === Validation Errors (exit code 4) ===
    ValidationFailed,
    InvalidStatus,
    InvalidCategory,
    InvalidRole,
    LastAdmin,

    // === Permission Errors (exit code 5) ===
    PermissionDenied,
    NotSignedIn,

    // === Notification Errors (exit code 6) ===
    MailFailed,

    // === Config Errors (exit code 7) ===
    ConfigError,

    // === I/O Errors (exit code 8) ===
    IoError,
    JsonError,
    YamlError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DatabaseNotFound => "DATABASE_NOT_FOUND",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::TicketNotFound => "TICKET_NOT_FOUND",
            Self::ProfileNotFound => "PROFILE_NOT_FOUND",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidCategory => "INVALID_CATEGORY",
            Self::InvalidRole => "INVALID_ROLE",
            Self::LastAdmin => "LAST_ADMIN",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NotSignedIn => "NOT_SIGNED_IN",
            Self::MailFailed => "MAIL_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// Store failures may clear up on retry; validation failures succeed
    /// once the input is fixed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError
                | Self::MailFailed
                | Self::ValidationFailed
                | Self::InvalidStatus
                | Self::InvalidCategory
                | Self::InvalidRole
        )
    }

    /// Get the exit code for this error category.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::DatabaseNotFound
            | Self::DatabaseError
            | Self::NotInitialized
            | Self::AlreadyInitialized => 2,
            Self::TicketNotFound | Self::ProfileNotFound => 3,
            Self::ValidationFailed
            | Self::InvalidStatus
            | Self::InvalidCategory
            | Self::InvalidRole
            | Self::LastAdmin => 4,
            Self::PermissionDenied | Self::NotSignedIn => 5,
            Self::MailFailed => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    /// Coarse class headline shown to humans
    #[serde(skip)]
    pub headline: &'static str,
}

impl StructuredError {
    /// Create a new structured error from a `DeskError`.
    #[must_use]
    pub fn from_error(err: &DeskError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = Self::generate_hint(err);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
            headline: err.kind().headline(),
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31m");
            output.push_str(self.headline);
            output.push_str(":\x1b[0m ");
        } else {
            output.push_str(self.headline);
            output.push_str(": ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &DeskError) -> (ErrorCode, Option<Value>) {
        match err {
            DeskError::DatabaseNotFound { path } => (
                ErrorCode::DatabaseNotFound,
                Some(json!({"path": path.display().to_string()})),
            ),
            DeskError::Database(_) => (ErrorCode::DatabaseError, None),
            DeskError::NotInitialized => (ErrorCode::NotInitialized, None),
            DeskError::AlreadyInitialized { path } => (
                ErrorCode::AlreadyInitialized,
                Some(json!({"path": path.display().to_string()})),
            ),
            DeskError::TicketNotFound { id } => {
                (ErrorCode::TicketNotFound, Some(json!({"searched_id": id})))
            }
            DeskError::ProfileNotFound { id } => {
                (ErrorCode::ProfileNotFound, Some(json!({"searched_id": id})))
            }
            DeskError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({"field": field, "reason": reason})),
            ),
            DeskError::ValidationErrors { errors } => (
                ErrorCode::ValidationFailed,
                Some(json!({
                    "errors": errors.iter()
                        .map(|e| json!({"field": e.field, "message": e.message}))
                        .collect::<Vec<_>>()
                })),
            ),
            DeskError::InvalidStatus { status } => (
                ErrorCode::InvalidStatus,
                Some(json!({"provided": status, "valid_values": VALID_STATUSES})),
            ),
            DeskError::InvalidCategory { category } => (
                ErrorCode::InvalidCategory,
                Some(json!({"provided": category, "valid_values": VALID_CATEGORIES})),
            ),
            DeskError::InvalidRole { role } => (
                ErrorCode::InvalidRole,
                Some(json!({"provided": role, "valid_values": VALID_ROLES})),
            ),
            DeskError::LastAdmin { id } => (ErrorCode::LastAdmin, Some(json!({"profile": id}))),
            DeskError::PermissionDenied { action, role } => (
                ErrorCode::PermissionDenied,
                Some(json!({"action": action, "role": role})),
            ),
            DeskError::NotSignedIn { .. } => (ErrorCode::NotSignedIn, None),
            DeskError::Mail { recipient, .. } => {
                (ErrorCode::MailFailed, Some(json!({"recipient": recipient})))
            }
            DeskError::Config(_) => (ErrorCode::ConfigError, None),
            DeskError::Io(_) => (ErrorCode::IoError, None),
            DeskError::Json(_) => (ErrorCode::JsonError, None),
            DeskError::Yaml(_) => (ErrorCode::YamlError, None),
        }
    }

    fn generate_hint(err: &DeskError) -> Option<String> {
        match err {
            DeskError::InvalidStatus { status } => {
                if let Some(detected) = detect_status_intent(status) {
                    return Some(format!("Did you mean '{detected}'?"));
                }
            }
            DeskError::InvalidCategory { category } => {
                if let Some(detected) = detect_category_intent(category) {
                    return Some(format!("Did you mean '{detected}'?"));
                }
            }
            DeskError::InvalidRole { role } => {
                if let Some(detected) = detect_role_intent(role) {
                    return Some(format!("Did you mean '{detected}'?"));
                }
            }
            DeskError::TicketNotFound { .. } => {
                return Some("Run 'td list' to see the tickets you can access.".to_string());
            }
            DeskError::ProfileNotFound { .. } => {
                return Some("Run 'td users' to list profiles.".to_string());
            }
            DeskError::PermissionDenied { .. } => {
                return Some("Ask a full administrator to change your role.".to_string());
            }
            _ => {}
        }

        if err.kind() == ErrorKind::Integration {
            return Some("The operation was not applied; try again.".to_string());
        }

        err.suggestion().map(str::to_string)
    }
}

// === Valid values ===

const VALID_STATUSES: [&str; 4] = ["New", "In Progress", "On Hold", "Completed"];
const VALID_CATEGORIES: [&str; 3] = ["IT", "Maintenance", "Housekeeping"];
const VALID_ROLES: [&str; 5] = [
    "user",
    "it_admin",
    "maintenance_admin",
    "housekeeping_admin",
    "admin",
];

/// Status synonyms for intent detection.
static STATUS_SYNONYMS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("done", "Completed"),
        ("complete", "Completed"),
        ("closed", "Completed"),
        ("resolved", "Completed"),
        ("finished", "Completed"),
        ("wip", "In Progress"),
        ("working", "In Progress"),
        ("started", "In Progress"),
        ("active", "In Progress"),
        ("open", "New"),
        ("todo", "New"),
        ("pending", "New"),
        ("hold", "On Hold"),
        ("paused", "On Hold"),
        ("waiting", "On Hold"),
        ("blocked", "On Hold"),
    ]
    .into_iter()
    .collect()
});

/// Category synonyms for intent detection.
static CATEGORY_SYNONYMS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    [
        ("tech", "IT"),
        ("computer", "IT"),
        ("network", "IT"),
        ("repair", "Maintenance"),
        ("facilities", "Maintenance"),
        ("cleaning", "Housekeeping"),
        ("janitorial", "Housekeeping"),
    ]
    .into_iter()
    .collect()
});

// === Intent Detection ===

fn squash(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn detect_from(
    input: &str,
    valid: &[&'static str],
    synonyms: &HashMap<&'static str, &'static str>,
) -> Option<&'static str> {
    let squashed = squash(input);
    if squashed.is_empty() {
        return None;
    }

    if let Some(&exact) = valid.iter().find(|v| squash(v) == squashed) {
        return Some(exact);
    }

    if let Some(&canonical) = synonyms.get(squashed.as_str()) {
        return Some(canonical);
    }

    valid.iter().copied().find(|v| squash(v).starts_with(&squashed))
}

/// Detect what status the user likely meant.
fn detect_status_intent(input: &str) -> Option<&'static str> {
    detect_from(input, &VALID_STATUSES, &STATUS_SYNONYMS)
}

/// Detect what category the user likely meant.
fn detect_category_intent(input: &str) -> Option<&'static str> {
    detect_from(input, &VALID_CATEGORIES, &CATEGORY_SYNONYMS)
}

/// Detect what role the user likely meant.
fn detect_role_intent(input: &str) -> Option<&'static str> {
    let squashed = squash(input);
    match squashed.as_str() {
        "superadmin" | "administrator" | "root" => Some("admin"),
        "it" | "itadmin" => Some("it_admin"),
        "maintenance" | "maintenanceadmin" => Some("maintenance_admin"),
        "housekeeping" | "housekeepingadmin" => Some("housekeeping_admin"),
        "member" | "requester" | "basic" => Some("user"),
        _ => detect_from(input, &VALID_ROLES, &HashMap::new()),
    }
}
