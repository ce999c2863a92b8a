use crate::model::{Profile, Role, TicketDetails};
use crate::policy::Capability;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A profile with what its role unlocks (`whoami`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub capabilities: Vec<String>,
}

impl ProfileView {
    #[must_use]
    pub fn new(profile: Profile) -> Self {
        let capabilities = Capability::ALL
            .iter()
            .filter(|cap| cap.allows(profile.role))
            .map(|cap| cap.describe().to_string())
            .collect();
        Self {
            profile,
            capabilities,
        }
    }
}

/// Result of `signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupView {
    #[serde(flatten)]
    pub profile: Profile,
    /// The requested role was replaced by `admin` because the desk had none.
    pub bootstrapped: bool,
}

/// Result of `role`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleChange {
    pub id: String,
    pub email: String,
    pub from: Role,
    pub to: Role,
}

/// A setting as shown by `settings get`; `value` is null when unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingView {
    pub key: String,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Tickets within a creation window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
    pub count: usize,
    pub tickets: Vec<TicketDetails>,
}
