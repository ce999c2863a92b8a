//! Error types and handling for `ticket_desk`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Every variant belongs to exactly one [`ErrorKind`] so callers can tell
//!   "you lack permission" from "the request was invalid" from "a system
//!   error occurred"
//! - Provides recovery hints for user-facing errors
//! - Provides structured JSON output for scripted callers

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `ticket_desk` operations.
#[derive(Error, Debug)]
pub enum DeskError {
    // === Store Errors ===
    /// Database file not found at the specified path.
    #[error("Database not found at '{path}'")]
    DatabaseNotFound { path: PathBuf },

    /// `SQLite` database error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // === Lookup Errors ===
    /// Ticket with the specified ID was not found (or is outside the caller's view).
    #[error("Ticket not found: {id}")]
    TicketNotFound { id: String },

    /// Profile with the specified ID or email was not found.
    #[error("Profile not found: {id}")]
    ProfileNotFound { id: String },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {errors:?}")]
    ValidationErrors { errors: Vec<ValidationError> },

    /// Invalid status value.
    #[error("Invalid status: {status}")]
    InvalidStatus { status: String },

    /// Invalid category value.
    #[error("Invalid category: {category}")]
    InvalidCategory { category: String },

    /// Invalid role value.
    #[error("Invalid role: {role}")]
    InvalidRole { role: String },

    /// The change would leave the desk without a full administrator.
    #[error("Cannot change role of {id}: it is the last admin")]
    LastAdmin { id: String },

    // === Permission Errors ===
    /// The acting role lacks the capability for this action.
    #[error("Permission denied: role '{role}' cannot {action}")]
    PermissionDenied { action: String, role: String },

    /// No identity could be resolved for this session.
    #[error("Not signed in: {reason}")]
    NotSignedIn { reason: String },

    // === Notification Errors ===
    /// Sending one message failed.
    #[error("Mail delivery to '{recipient}' failed: {reason}")]
    Mail { recipient: String, reason: String },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ticket desk workspace not initialized.
    #[error("Ticket desk not initialized: run 'td init' first")]
    NotInitialized,

    /// Already initialized.
    #[error("Already initialized at '{path}'")]
    AlreadyInitialized { path: PathBuf },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Coarse error classes surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; nothing was changed.
    Validation,
    /// The actor's role lacks the required capability; nothing was changed.
    Permission,
    /// A referenced ticket or profile does not exist.
    NotFound,
    /// The store, identity provider, or mailer failed.
    Integration,
    /// Local setup or tooling problem.
    Internal,
}

impl ErrorKind {
    /// Leading sentence for human-readable output.
    #[must_use]
    pub const fn headline(self) -> &'static str {
        match self {
            Self::Validation => "Invalid request",
            Self::Permission => "You do not have permission to do that",
            Self::NotFound => "Not found",
            Self::Integration => "A system error occurred, try again",
            Self::Internal => "Error",
        }
    }
}

/// A single field validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// The reason for the validation failure.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl DeskError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::ValidationErrors { .. }
            | Self::InvalidStatus { .. }
            | Self::InvalidCategory { .. }
            | Self::InvalidRole { .. }
            | Self::LastAdmin { .. } => ErrorKind::Validation,
            Self::PermissionDenied { .. } | Self::NotSignedIn { .. } => ErrorKind::Permission,
            Self::TicketNotFound { .. } | Self::ProfileNotFound { .. } => ErrorKind::NotFound,
            Self::Database(_) | Self::DatabaseNotFound { .. } | Self::Mail { .. } => {
                ErrorKind::Integration
            }
            Self::Config(_)
            | Self::NotInitialized
            | Self::AlreadyInitialized { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_) => ErrorKind::Internal,
        }
    }

    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Validation | ErrorKind::Permission | ErrorKind::NotFound
        ) || matches!(self, Self::NotInitialized | Self::DatabaseNotFound { .. })
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run: td init"),
            Self::DatabaseNotFound { .. } => Some("Check path or run: td init"),
            Self::AlreadyInitialized { .. } => Some("Use --force to reinitialize"),
            Self::NotSignedIn { .. } => {
                Some("Pass --as <email>, set TD_ACTOR, or run: td signup <email> <name>")
            }
            Self::InvalidStatus { .. } => {
                Some("Valid statuses: New, In Progress, On Hold, Completed")
            }
            Self::InvalidCategory { .. } => Some("Valid categories: IT, Maintenance, Housekeeping"),
            Self::InvalidRole { .. } => Some(
                "Valid roles: user, it_admin, maintenance_admin, housekeeping_admin, admin",
            ),
            Self::LastAdmin { .. } => Some("Promote another profile to admin first"),
            _ => None,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a permission error for an action attempted by a role.
    #[must_use]
    pub fn permission(action: impl Into<String>, role: impl std::fmt::Display) -> Self {
        Self::PermissionDenied {
            action: action.into(),
            role: role.to_string(),
        }
    }

    /// Create from multiple validation errors.
    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }
}

/// Result type using `DeskError`.
pub type Result<T> = std::result::Result<T, DeskError>;
