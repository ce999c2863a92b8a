//! Output formatting for `ticket_desk`.
//!
//! Human-readable text goes through [`text`]; `--json` output serializes the
//! view types in [`output`] (or the model types directly) to stdout, with
//! diagnostics kept on stderr.

mod output;
mod text;

pub use output::{HistoryView, ProfileView, RoleChange, SettingView, SignupView};
pub use text::{
    TextFormatOptions, format_category_badge, format_profile_line, format_role_label,
    format_stats, format_status_icon, format_status_icon_colored, format_status_label,
    format_ticket_details, format_ticket_line, format_ticket_line_with, format_ticket_row,
    format_timestamp, terminal_width, truncate_title,
};
