//! Shared utilities for `ticket_desk`.
//!
//! - ID generation (base36 adaptive)
//! - Time parsing (RFC3339, dates, relative offsets)
//! - HTML escaping for notification bodies

pub mod id;
pub mod time;

pub use id::{IdConfig, IdGenerator, PROFILE_PREFIX, TICKET_PREFIX, normalize_id};

/// Escape text for inclusion in an HTML body.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
