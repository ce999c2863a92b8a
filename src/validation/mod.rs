//! Validation helpers for `ticket_desk`.
//!
//! These routines check input before anything touches storage and return
//! every problem found, not just the first.

use crate::error::ValidationError;
use crate::model::Category;
use regex::Regex;
use std::sync::LazyLock;

pub const MAX_TITLE_LEN: usize = 500;
pub const MAX_DESCRIPTION_LEN: usize = 102_400;
pub const MAX_NAME_LEN: usize = 200;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .unwrap_or_else(|_| unreachable!("static email pattern compiles"))
});

/// True if `email` looks deliverable.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Raw ticket input as typed by the requester.
#[derive(Debug, Clone, Copy)]
pub struct TicketInput<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub category: &'a str,
}

/// Validates new-ticket input.
pub struct TicketValidator;

impl TicketValidator {
    /// Validate input, returning the parsed category on success.
    ///
    /// # Errors
    ///
    /// Returns every rule violated: empty or overlong title, overlong
    /// description, unknown category.
    pub fn validate(input: &TicketInput<'_>) -> Result<Category, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let title = input.title.trim();
        if title.is_empty() {
            errors.push(ValidationError::new("title", "cannot be empty"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            errors.push(ValidationError::new("title", "exceeds 500 characters"));
        }

        if let Some(description) = input.description {
            if description.len() > MAX_DESCRIPTION_LEN {
                errors.push(ValidationError::new("description", "exceeds 100KB"));
            }
        }

        let category = if input.category.trim().is_empty() {
            errors.push(ValidationError::new("category", "is required"));
            None
        } else if let Ok(category) = input.category.parse::<Category>() {
            Some(category)
        } else {
            errors.push(ValidationError::new(
                "category",
                "must be one of IT, Maintenance, Housekeeping",
            ));
            None
        };

        match category {
            Some(category) if errors.is_empty() => Ok(category),
            _ => Err(errors),
        }
    }
}

/// Validates sign-up input.
pub struct ProfileValidator;

impl ProfileValidator {
    /// # Errors
    ///
    /// Returns every rule violated for the email and display name.
    pub fn validate(email: &str, full_name: &str) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if email.trim().is_empty() {
            errors.push(ValidationError::new("email", "cannot be empty"));
        } else if !is_valid_email(email) {
            errors.push(ValidationError::new("email", "is not a valid address"));
        }

        if full_name.trim().is_empty() {
            errors.push(ValidationError::new("full_name", "cannot be empty"));
        }
        if full_name.chars().count() > MAX_NAME_LEN {
            errors.push(ValidationError::new("full_name", "exceeds 200 characters"));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
