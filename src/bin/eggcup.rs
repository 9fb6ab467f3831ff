// src/bin/eggcup.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use eggcup::{
    cli::{Cli, handlers},
    system::launcher::LaunchError,
};

// --- Command Definition and Registry ---

/// Defines a command and its aliases. Handlers are async, so dispatch runs
/// through the match in `run_cli`; the registry only answers name lookups.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
}

/// The single source of truth for the command set. A new command needs an
/// entry here and an arm in `run_cli`.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "dev",
        aliases: &["d"],
    },
    CommandDefinition {
        name: "test",
        aliases: &["t"],
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// The main entry point of the `eggcup` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and performs centralized error handling.
#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()).await {
        // --- Centralized Error Handling ---
        // A child that ran and failed has already written its own output.
        // Mirror its exit code instead of stacking another message on top.
        if let Some(launch_err) = e.downcast_ref::<LaunchError>()
            && matches!(launch_err, LaunchError::Exit { .. })
        {
            std::process::exit(launch_err.exit_code());
        }

        // For all other errors, print the full context chain and fail.
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// The application dispatcher: the first free argument names the command,
/// everything after it goes to that command's own parser untouched.
async fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let mut args = cli.args;
    if args.is_empty() {
        println!("{}", Cli::render_help());
        return Ok(());
    }
    let action = args.remove(0);

    match find_command(&action).map(|cmd| cmd.name) {
        Some("dev") => handlers::dev::handle(args).await,
        Some("test") => handlers::test::handle(args).await,
        _ => Err(anyhow!(
            "Unknown command '{}'. Known commands: {}.",
            action,
            COMMAND_REGISTRY
                .iter()
                .map(|cmd| cmd.name)
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}
