//! Settings command implementation.

use crate::cli::SettingsCommands;
use crate::config::CliOverrides;
use crate::error::Result;
use crate::format::SettingView;
use crate::model::AdminSetting;
use crate::service::settings;

use super::{DeskContext, OutputOptions};

/// Read (anyone) or write (admins) a desk setting.
///
/// # Errors
///
/// Returns `PermissionDenied` for non-admin writes, a validation error for
/// an unknown key or mistyped value, or a database error.
pub fn execute(
    command: &SettingsCommands,
    output: &OutputOptions,
    cli: &CliOverrides,
) -> Result<()> {
    let view = match command {
        SettingsCommands::Get { key } => {
            let ctx = DeskContext::open(cli)?;
            settings::get(&ctx.storage, key)?.map_or_else(
                || SettingView {
                    key: key.clone(),
                    value: serde_json::Value::Null,
                    updated_at: None,
                },
                view_of,
            )
        }
        SettingsCommands::Set { key, value } => {
            let (mut ctx, session) = DeskContext::signed_in(cli)?;
            view_of(settings::set(
                &mut ctx.storage,
                &session,
                key,
                settings::parse_value(value),
            )?)
        }
    };

    if output.json {
        return output.print_json(&view);
    }
    output.say(format!("{} = {}", view.key, view.value));
    Ok(())
}

fn view_of(setting: AdminSetting) -> SettingView {
    SettingView {
        key: setting.key,
        value: setting.value,
        updated_at: Some(setting.updated_at),
    }
}
