//! Core data types for `ticket_desk`.
//!
//! This module defines the fundamental types used throughout the application:
//! - `Role` - Who may see and change what
//! - `Category` - Ticket categories, each paired with one admin role
//! - `Status` - Ticket lifecycle states
//! - `Profile` - A registered person
//! - `Ticket` - The core work item
//! - `AdminSetting` - Keyed desk-wide settings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DeskError;

/// Access role held by a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    ItAdmin,
    MaintenanceAdmin,
    HousekeepingAdmin,
    Admin,
}

impl Role {
    pub const ALL: [Self; 5] = [
        Self::User,
        Self::ItAdmin,
        Self::MaintenanceAdmin,
        Self::HousekeepingAdmin,
        Self::Admin,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::ItAdmin => "it_admin",
            Self::MaintenanceAdmin => "maintenance_admin",
            Self::HousekeepingAdmin => "housekeeping_admin",
            Self::Admin => "admin",
        }
    }

    /// Human label used in tables.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::ItAdmin => "IT Admin",
            Self::MaintenanceAdmin => "Maintenance Admin",
            Self::HousekeepingAdmin => "Housekeeping Admin",
            Self::Admin => "Admin",
        }
    }

    /// The category a category admin is responsible for.
    ///
    /// `None` for `User` and `Admin`.
    #[must_use]
    pub const fn category(&self) -> Option<Category> {
        match self {
            Self::ItAdmin => Some(Category::It),
            Self::MaintenanceAdmin => Some(Category::Maintenance),
            Self::HousekeepingAdmin => Some(Category::Housekeeping),
            Self::User | Self::Admin => None,
        }
    }

    /// Parse a stored role value, treating anything unknown as `User`.
    ///
    /// Stored data must never block a read; unknown values get least privilege.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "user" => Ok(Self::User),
            "it_admin" => Ok(Self::ItAdmin),
            "maintenance_admin" => Ok(Self::MaintenanceAdmin),
            "housekeeping_admin" => Ok(Self::HousekeepingAdmin),
            "admin" => Ok(Self::Admin),
            _ => Err(DeskError::InvalidRole {
                role: s.to_string(),
            }),
        }
    }
}

/// Ticket category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "IT")]
    It,
    Maintenance,
    Housekeeping,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::It, Self::Maintenance, Self::Housekeeping];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::It => "IT",
            Self::Maintenance => "Maintenance",
            Self::Housekeeping => "Housekeeping",
        }
    }

    /// The admin role paired with this category.
    #[must_use]
    pub const fn admin_role(&self) -> Role {
        match self {
            Self::It => Role::ItAdmin,
            Self::Maintenance => Role::MaintenanceAdmin,
            Self::Housekeeping => Role::HousekeepingAdmin,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "it" => Ok(Self::It),
            "maintenance" => Ok(Self::Maintenance),
            "housekeeping" => Ok(Self::Housekeeping),
            _ => Err(DeskError::InvalidCategory {
                category: s.to_string(),
            }),
        }
    }
}

/// Ticket lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "On Hold")]
    OnHold,
    Completed,
}

impl Status {
    pub const ALL: [Self; 4] = [Self::New, Self::InProgress, Self::OnHold, Self::Completed];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In Progress",
            Self::OnHold => "On Hold",
            Self::Completed => "Completed",
        }
    }

    /// Suggested next state for the one-click advance action.
    ///
    /// Nothing advances into `OnHold`; it is only reachable by a direct set.
    #[must_use]
    pub const fn advance(&self) -> Self {
        match self {
            Self::New | Self::OnHold => Self::InProgress,
            Self::InProgress | Self::Completed => Self::Completed,
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "new" => Ok(Self::New),
            "inprogress" => Ok(Self::InProgress),
            "onhold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            _ => Err(DeskError::InvalidStatus {
                status: s.to_string(),
            }),
        }
    }
}

/// A registered person. One per identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// Opaque identity reference (e.g., "usr-k3x9").
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    #[must_use]
    pub fn to_ref(&self) -> ProfileRef {
        ProfileRef {
            id: self.id.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Joined view of a profile, as embedded in ticket reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileRef {
    pub id: String,
    pub full_name: String,
    pub email: String,
}

/// The primary ticket entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    /// Unique ID (e.g., "tk-a1b2").
    pub id: String,

    /// Title (1-500 chars, non-empty after trimming).
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fixed at creation.
    pub category: Category,

    #[serde(default)]
    pub status: Status,

    /// Profile that opened the ticket. Immutable.
    pub requester_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    /// Last modification; the only audit trail kept.
    pub updated_at: DateTime<Utc>,
}

/// Ticket joined with its requester and assignee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TicketDetails {
    #[serde(flatten)]
    pub ticket: Ticket,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requester: Option<ProfileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<ProfileRef>,
}

/// Per-status counts for dashboard summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketStats {
    pub total: usize,
    pub new: usize,
    pub in_progress: usize,
    pub on_hold: usize,
    pub completed: usize,
}

impl TicketStats {
    #[must_use]
    pub fn from_tickets<'a>(tickets: impl IntoIterator<Item = &'a Ticket>) -> Self {
        let mut stats = Self::default();
        for ticket in tickets {
            stats.total += 1;
            match ticket.status {
                Status::New => stats.new += 1,
                Status::InProgress => stats.in_progress += 1,
                Status::OnHold => stats.on_hold += 1,
                Status::Completed => stats.completed += 1,
            }
        }
        stats
    }

    #[must_use]
    pub const fn count(&self, status: Status) -> usize {
        match status {
            Status::New => self.new,
            Status::InProgress => self.in_progress,
            Status::OnHold => self.on_hold,
            Status::Completed => self.completed,
        }
    }
}

/// Settings key controlling whether admin self-signup is offered.
pub const HIDE_ADMIN_SIGNUP: &str = "hide_admin_signup";

/// A keyed desk-wide setting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminSetting {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
