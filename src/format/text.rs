//! Text formatting for terminal output.
//!
//! - Status icons (○ ◐ ⏸ ✓)
//! - Category badges ([IT], [Maintenance], [Housekeeping])
//! - Ticket, profile and summary lines

use crate::model::{Category, Profile, Role, Status, Ticket, TicketDetails, TicketStats};
use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use std::fmt::Write as _;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Status icon characters.
pub mod icons {
    /// Freshly opened (hollow circle).
    pub const NEW: &str = "○";
    /// Being worked (half-filled).
    pub const IN_PROGRESS: &str = "◐";
    /// Waiting on something (pause).
    pub const ON_HOLD: &str = "⏸";
    /// Done (checkmark).
    pub const COMPLETED: &str = "✓";
}

/// Formatting options for text output.
#[derive(Debug, Clone, Copy)]
pub struct TextFormatOptions {
    pub use_color: bool,
    pub max_width: Option<usize>,
}

impl TextFormatOptions {
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            use_color: false,
            max_width: None,
        }
    }
}

#[must_use]
pub const fn format_status_icon(status: Status) -> &'static str {
    match status {
        Status::New => icons::NEW,
        Status::InProgress => icons::IN_PROGRESS,
        Status::OnHold => icons::ON_HOLD,
        Status::Completed => icons::COMPLETED,
    }
}

fn paint_status(text: &str, status: Status) -> String {
    match status {
        Status::New => text.green().to_string(),
        Status::InProgress => text.yellow().to_string(),
        Status::OnHold => text.blue().to_string(),
        Status::Completed => text.bright_black().to_string(),
    }
}

/// Format status label with optional color.
#[must_use]
pub fn format_status_label(status: Status, use_color: bool) -> String {
    if use_color {
        paint_status(status.as_str(), status)
    } else {
        status.as_str().to_string()
    }
}

/// Format status icon with optional color.
#[must_use]
pub fn format_status_icon_colored(status: Status, use_color: bool) -> String {
    let icon = format_status_icon(status);
    if use_color {
        paint_status(icon, status)
    } else {
        icon.to_string()
    }
}

/// Format a category as a bracketed badge.
#[must_use]
pub fn format_category_badge(category: Category, use_color: bool) -> String {
    let label = category.as_str();
    if !use_color {
        return format!("[{label}]");
    }
    let colored = match category {
        Category::It => label.cyan().to_string(),
        Category::Maintenance => label.magenta().to_string(),
        Category::Housekeeping => label.blue().to_string(),
    };
    format!("[{colored}]")
}

/// Format a role label; admins are highlighted.
#[must_use]
pub fn format_role_label(role: Role, use_color: bool) -> String {
    let label = role.label();
    if !use_color {
        return label.to_string();
    }
    match role {
        Role::Admin => label.red().bold().to_string(),
        Role::User => label.normal().to_string(),
        _ => label.yellow().to_string(),
    }
}

/// Determine terminal width from environment (falls back to 80).
#[must_use]
pub fn terminal_width() -> usize {
    if let Ok(columns) = std::env::var("COLUMNS") {
        if let Ok(value) = columns.trim().parse::<usize>() {
            if value > 0 {
                return value;
            }
        }
    }
    80
}

fn take_columns(text: &str, limit: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + cw > limit {
            break;
        }
        used += cw;
        out.push(c);
    }
    out
}

/// Truncate a title to fit within `max_len` visible columns.
///
/// Wide characters (emoji, CJK) count for their display width.
#[must_use]
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if UnicodeWidthStr::width(title) <= max_len {
        return title.to_string();
    }
    if max_len <= 3 {
        return take_columns(title, max_len);
    }
    let mut out = take_columns(title, max_len - 3);
    out.push_str("...");
    out
}

/// Local-time rendering used in human output.
#[must_use]
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Format a single-line ticket summary with options.
///
/// Format: `{icon} {id} [{category}] {title}`
#[must_use]
pub fn format_ticket_line_with(ticket: &Ticket, options: TextFormatOptions) -> String {
    let badge_plain = format_category_badge(ticket.category, false);
    let prefix_len = UnicodeWidthStr::width(format_status_icon(ticket.status))
        + 1
        + UnicodeWidthStr::width(ticket.id.as_str())
        + 1
        + UnicodeWidthStr::width(badge_plain.as_str())
        + 1;

    let title = options.max_width.map_or_else(
        || ticket.title.clone(),
        |width| truncate_title(&ticket.title, width.saturating_sub(prefix_len)),
    );

    format!(
        "{} {} {} {title}",
        format_status_icon_colored(ticket.status, options.use_color),
        ticket.id,
        format_category_badge(ticket.category, options.use_color),
    )
}

#[must_use]
pub fn format_ticket_line(ticket: &Ticket) -> String {
    format_ticket_line_with(ticket, TextFormatOptions::plain())
}

/// List row: summary line plus requester and assignee names.
#[must_use]
pub fn format_ticket_row(details: &TicketDetails, options: TextFormatOptions) -> String {
    let requester = details
        .requester
        .as_ref()
        .map_or("?", |r| r.full_name.as_str());
    let assignee = details
        .assignee
        .as_ref()
        .map_or("unassigned", |a| a.full_name.as_str());
    let suffix = format!("  ({requester} -> {assignee})");
    let line = format_ticket_line_with(
        &details.ticket,
        TextFormatOptions {
            max_width: options
                .max_width
                .map(|w| w.saturating_sub(UnicodeWidthStr::width(suffix.as_str()))),
            ..options
        },
    );
    if options.use_color {
        format!("{line}{}", suffix.bright_black())
    } else {
        format!("{line}{suffix}")
    }
}

/// Multi-line view for `show`.
#[must_use]
pub fn format_ticket_details(details: &TicketDetails, use_color: bool) -> String {
    let ticket = &details.ticket;
    let mut out = String::new();
    let title = if use_color {
        ticket.title.bold().to_string()
    } else {
        ticket.title.clone()
    };
    let _ = writeln!(out, "{} {title}", ticket.id);
    let _ = writeln!(
        out,
        "Status:    {} {}",
        format_status_icon_colored(ticket.status, use_color),
        format_status_label(ticket.status, use_color)
    );
    let _ = writeln!(out, "Category:  {}", ticket.category);
    if let Some(requester) = &details.requester {
        let _ = writeln!(
            out,
            "Requester: {} <{}>",
            requester.full_name, requester.email
        );
    }
    match &details.assignee {
        Some(assignee) => {
            let _ = writeln!(out, "Assignee:  {} <{}>", assignee.full_name, assignee.email);
        }
        None => {
            let _ = writeln!(out, "Assignee:  unassigned");
        }
    }
    let _ = writeln!(out, "Created:   {}", format_timestamp(&ticket.created_at));
    let _ = writeln!(out, "Updated:   {}", format_timestamp(&ticket.updated_at));
    if let Some(due) = &ticket.due_date {
        let _ = writeln!(out, "Due:       {}", format_timestamp(due));
    }
    if let Some(description) = &ticket.description {
        let _ = writeln!(out);
        for line in description.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    out
}

/// Format: `{id} {role} {name} <{email}>`
#[must_use]
pub fn format_profile_line(profile: &Profile, use_color: bool) -> String {
    let role = format_role_label(profile.role, use_color);
    let padding = 22usize.saturating_sub(UnicodeWidthStr::width(profile.role.label()));
    format!(
        "{} {role}{} {} <{}>",
        profile.id,
        " ".repeat(padding),
        profile.full_name,
        profile.email
    )
}

/// Dashboard counts, one status per line.
#[must_use]
pub fn format_stats(stats: &TicketStats, use_color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total:       {}", stats.total);
    for status in Status::ALL {
        let label = format!("{}:", status.as_str());
        let _ = writeln!(
            out,
            "{} {label:<12} {}",
            format_status_icon_colored(status, use_color),
            stats.count(status)
        );
    }
    out
}
