use clap::Parser;
use std::io::{self, IsTerminal};
use ticket_desk::cli::commands::{self, OutputOptions};
use ticket_desk::cli::{Cli, Commands};
use ticket_desk::logging::init_logging;
use ticket_desk::{DeskError, StructuredError};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, None) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = cli.overrides();
    let output = OutputOptions::from_cli(&cli);

    let result = match &cli.command {
        Commands::Init { force } => commands::init::execute(*force, &output),
        Commands::Signup(args) => commands::signup::execute(args, &output, &overrides),
        Commands::Whoami => commands::whoami::execute(&output, &overrides),
        Commands::Create(args) => commands::create::execute(args, &output, &overrides),
        Commands::List(args) => commands::list::execute(args, &output, &overrides),
        Commands::Show { id } => commands::show::execute(id, &output, &overrides),
        Commands::Status { id, status } => {
            commands::status::execute(id, status, &output, &overrides)
        }
        Commands::Advance { id } => commands::advance::execute(id, &output, &overrides),
        Commands::Assign(args) => commands::assign::execute(args, &output, &overrides),
        Commands::History(args) => commands::history::execute(args, &output, &overrides),
        Commands::Stats(args) => commands::stats::execute(args, &output, &overrides),
        Commands::Users => commands::users::execute(&output, &overrides),
        Commands::Role { profile, role } => {
            commands::role::execute(profile, role, &output, &overrides)
        }
        Commands::Settings { command } => {
            commands::settings::execute(command, &output, &overrides)
        }
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Print the error and exit with its class's code.
///
/// JSON goes to stderr when `--json` is set or stdout is not a terminal;
/// otherwise a human message, colored when stderr is a terminal.
fn handle_error(err: &DeskError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.code.exit_code();

    if json_mode || !io::stdout().is_terminal() {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        eprintln!("{}", structured.to_human(io::stderr().is_terminal()));
    }

    std::process::exit(exit_code);
}
