// src/system/launcher.rs

use crate::models::LaunchConfig;
use crate::system::guardian::Guardian;
use colored::Colorize;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Command '{command}' could not be executed: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Command '{command}' exited with {}.", .code.map_or_else(|| String::from("a signal"), |c| format!("code {}", c)))]
    Exit { command: String, code: Option<i32> },
}

impl LaunchError {
    /// The exit code the tool itself should propagate for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Spawn { .. } => 1,
            Self::Exit { code, .. } => code.unwrap_or(1),
        }
    }
}

/// Per-launch settings layered on top of a frozen [`LaunchConfig`].
#[derive(Debug, Default)]
pub struct ForkOptions {
    /// Working directory for the child; defaults to the launch base dir.
    pub cwd: Option<PathBuf>,
    /// Extra environment entries, applied after the config's own.
    pub env: HashMap<String, String>,
    /// Extra interpreter flags, placed after the config's exec argv.
    pub exec_argv: Vec<String>,
}

/// Renders an argv list into one printable line. Used for dry runs and error
/// messages only; the child is always spawned from the list itself.
fn render_command(program: &str, argv: &[String]) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(argv.len() + 1);
    parts.push(program);
    parts.extend(argv.iter().map(String::as_str));
    shlex::try_join(parts.iter().copied()).unwrap_or_else(|_| parts.join(" "))
}

/// Forks a Node.js child running `module_path` and waits for it to finish.
///
/// The argv is assembled as a list (config exec argv, per-launch exec argv,
/// the module, then user args) and handed to the OS as-is. Nothing passes
/// through a shell, so hook paths with spaces survive verbatim.
///
/// The child is registered with the guardian for the whole wait, inherits
/// the parent's stdio, and is deregistered however the wait ends. A child
/// that exits non-zero (or dies to a signal) surfaces as [`LaunchError::Exit`].
pub async fn fork_node(
    guardian: &Guardian,
    config: &LaunchConfig,
    module_path: &Path,
    args: &[String],
    opts: ForkOptions,
) -> Result<(), LaunchError> {
    let mut argv: Vec<String> = Vec::new();
    argv.extend(config.exec_argv.iter().cloned());
    argv.extend(opts.exec_argv.iter().cloned());
    argv.push(module_path.display().to_string());
    argv.extend(args.iter().cloned());

    let rendered = render_command(&config.node_bin, &argv);

    if config.dry_run {
        println!("{} {}", "Would run:".cyan().bold(), rendered);
        return Ok(());
    }

    let cwd = opts.cwd.unwrap_or_else(|| config.base_dir.clone());
    let clean_cwd = dunce::simplified(&cwd);

    debug!("Forking '{}' in '{}'.", rendered, clean_cwd.display());

    let mut command = Command::new(&config.node_bin);
    command
        .args(&argv)
        .current_dir(clean_cwd)
        .envs(&config.env)
        .envs(&opts.env)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    let mut child = command.spawn().map_err(|e| LaunchError::Spawn {
        command: rendered.clone(),
        source: e,
    })?;

    // Pid 0 addresses the caller's whole process group on kill(2); a child
    // without a real pid stays untracked.
    let child_pid = child.id();
    match child_pid {
        Some(pid) => guardian.register(pid, &rendered),
        None => warn!("Child '{}' exposed no pid, not tracking it.", rendered),
    }
    // The registry entry must go away however the wait below unwinds.
    let _deregister = scopeguard::guard(child_pid, |pid| {
        if let Some(pid) = pid {
            guardian.deregister(pid);
        }
    });

    let status = child.wait().await.map_err(|e| LaunchError::Spawn {
        command: rendered.clone(),
        source: e,
    })?;

    if status.success() {
        debug!("Child '{}' finished cleanly.", rendered);
        Ok(())
    } else {
        Err(LaunchError::Exit {
            command: rendered,
            code: status.code(),
        })
    }
}

// MARK: --- UNIT TESTS ---
