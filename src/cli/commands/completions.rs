//! Shell completions generation command.
//!
//! ```bash
//! td completions bash > ~/.local/share/bash-completion/completions/td
//! td completions zsh -o ~/.zsh/completions/_td
//! ```

use crate::cli::{Cli, CompletionsArgs, ShellType};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io;
use tracing::info;

/// Execute the completions command.
///
/// # Errors
///
/// Returns an error if the output file cannot be written.
pub fn execute(args: &CompletionsArgs) -> Result<()> {
    info!(shell = ?args.shell, output = ?args.output, "Generating shell completions");

    let mut cmd = Cli::command();
    let shell = convert_shell_type(args.shell);

    if let Some(path) = &args.output {
        let mut file = std::fs::File::create(path)?;
        generate(shell, &mut cmd, "td", &mut file);
        eprintln!("Generated {shell} completions to {}", path.display());
    } else {
        generate(shell, &mut cmd, "td", &mut io::stdout());
    }
    Ok(())
}

const fn convert_shell_type(shell: ShellType) -> Shell {
    match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
        ShellType::PowerShell => Shell::PowerShell,
        ShellType::Elvish => Shell::Elvish,
    }
}
