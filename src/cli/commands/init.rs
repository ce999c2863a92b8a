//! Init command implementation.

use crate::config;
use crate::error::Result;
use std::env;
use tracing::info;

use super::OutputOptions;

/// Create `.tickets/` in the current directory.
///
/// # Errors
///
/// Returns `AlreadyInitialized` unless `force` is set, or an I/O / database error.
pub fn execute(force: bool, output: &OutputOptions) -> Result<()> {
    let root = env::current_dir()?;
    let desk_dir = config::init_desk_dir(&root, force)?;
    info!(path = %desk_dir.display(), "Initialized ticket desk");

    if output.json {
        return output.print_json(&serde_json::json!({
            "path": desk_dir,
        }));
    }
    output.say(format!("Initialized ticket desk in {}", desk_dir.display()));
    output.say("Next: td signup <email> --name \"Your Name\"");
    Ok(())
}
