// src/cli/handlers/dev.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::collections::HashMap;

use super::commons;
use crate::cli::args::RuntimeArgs;
use crate::constants::{DEFAULT_ENTRY, NODE_ENV_VAR};
use crate::models::{LaunchConfig, PackageJson};
use crate::system::guardian::Guardian;
use crate::system::launcher::{self, ForkOptions};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
struct DevArgs {
    #[command(flatten)]
    runtime: RuntimeArgs,

    /// Entry module to run. Defaults to the manifest's "main", then index.js.
    #[arg(long)]
    entry: Option<String>,

    /// Port passed through to the application as `--port <PORT>`.
    #[arg(long)]
    port: Option<u16>,

    /// Everything else is handed to the child verbatim.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

/// The entry chain: explicit flag, then the manifest's "main", then the
/// conventional default.
fn resolve_entry(flag: Option<&str>, package: &PackageJson) -> String {
    flag.map(str::to_string)
        .or_else(|| package.main.clone())
        .unwrap_or_else(|| DEFAULT_ENTRY.to_string())
}

/// Development runs get `NODE_ENV=development`, but only when the caller has
/// not already fixed one.
fn development_env(config: &LaunchConfig) -> HashMap<String, String> {
    let mut env = HashMap::new();
    if !config.env.contains_key(NODE_ENV_VAR) {
        env.insert(NODE_ENV_VAR.to_string(), "development".to_string());
    }
    env
}

pub async fn handle(args: Vec<String>) -> Result<()> {
    // 1. Parse args.
    let dev_args = DevArgs::try_parse_from(&args)?;

    // 2. Resolve the frozen launch picture.
    let prepared = commons::prepare_launch(&dev_args.runtime)?;

    // 3. Pick the entry module.
    let entry = resolve_entry(dev_args.entry.as_deref(), &prepared.package);
    let entry_path = prepared.config.base_dir.join(&entry);

    // 4. Assemble the application arguments.
    let mut child_args = Vec::new();
    if let Some(port) = dev_args.port {
        child_args.push("--port".to_string());
        child_args.push(port.to_string());
    }
    child_args.extend(dev_args.args.iter().cloned());

    if !prepared.config.dry_run {
        println!(
            "{} {}",
            "Starting development server:".green().bold(),
            entry_path.display()
        );
    }

    // 5. Fork and wait; the guardian covers the child until it exits.
    let opts = ForkOptions {
        env: development_env(&prepared.config),
        ..ForkOptions::default()
    };
    launcher::fork_node(
        Guardian::global(),
        &prepared.config,
        &entry_path,
        &child_args,
        opts,
    )
    .await
    .with_context(|| format!("Development run of '{}' failed", entry_path.display()))
}

// MARK: --- UNIT TESTS ---
