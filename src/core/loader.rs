// src/core/loader.rs

use crate::constants::{
    DECLARATIONS_BIN, DEFAULT_COMPILER, DEFAULT_ESM_LOADER, NODE_MODULES_DIRNAME, PATHS_REGISTER,
    TS_COMPILER_VAR,
};
use crate::core::launch_env::LaunchEnv;
use crate::core::module_resolver::{self, ModuleResolveError};
use crate::models::{PackageJson, ResolvedModes};
use colored::Colorize;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error(transparent)]
    Resolve(#[from] ModuleResolveError),
    #[error("Could not express '{path}' as a file URL.")]
    FileUrl { path: String },
    #[error("Declarations generator '{bin}' not found in '{dir}'. Is it installed?")]
    GeneratorMissing { bin: String, dir: String },
    #[error("Declarations generator '{bin}' could not be started: {source}")]
    GeneratorSpawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Declarations generator '{bin}' exited with a non-zero status.")]
    GeneratorFailed { bin: String },
}

/// The outcome of one injection pass.
#[derive(Debug, Default)]
pub struct AppliedLoaders {
    /// The resolved compiler hook, when TypeScript mode is on.
    pub compiler_register: Option<PathBuf>,
    /// The options appended to the composed options variable, in injection
    /// order. Options that were already present are not repeated here.
    pub options: Vec<String>,
}

/// Resolves and injects every hook the resolved modes require.
///
/// Classic targets receive `--require` options with backslash-doubled paths
/// so the value survives the shell-style split node applies to the composed
/// options variable. Modern targets receive `--loader`/`--import` options
/// with file URLs; the modern loader hook subsumes the classic compiler
/// register, so a modern target never gets a `--require` for the compiler.
///
/// A hook that cannot be resolved aborts the launch. When declarations mode
/// is on, the external generator runs to completion first; its failure
/// aborts the launch too.
pub fn apply(
    env: &mut LaunchEnv,
    exec_argv: &mut Vec<String>,
    modes: &ResolvedModes,
    package: &PackageJson,
    base_dir: &Path,
    compiler_flag: Option<&str>,
) -> Result<AppliedLoaders, LoaderError> {
    let mut applied = AppliedLoaders::default();

    apply_reverts(exec_argv, package);

    if modes.declarations {
        generate_declarations(base_dir)?;
    }

    let roots = module_resolver::standard_module_roots(base_dir);

    if modes.typescript {
        let specifier = compiler_specifier(compiler_flag, env, package, modes.esm);
        debug!("Compiler hook specifier: {}", specifier);
        let compiler = module_resolver::resolve_module(&specifier, base_dir, &roots)?;
        let paths_register = module_resolver::resolve_module(PATHS_REGISTER, base_dir, &roots)?;

        if modes.esm {
            inject(env, &mut applied, format!("--loader {}", file_url(&compiler)?));
            inject(
                env,
                &mut applied,
                format!("--import {}", file_url(&paths_register)?),
            );
        } else {
            inject(
                env,
                &mut applied,
                format!("--require {}", escape_backslashes(&compiler)),
            );
            inject(
                env,
                &mut applied,
                format!("--require {}", escape_backslashes(&paths_register)),
            );
        }
        applied.compiler_register = Some(compiler);
    }

    // Extra hooks declared by the target itself, resolved like any other.
    if modes.esm {
        for spec in package.egg.import_entries() {
            let hook = module_resolver::resolve_module(spec, base_dir, &roots)?;
            inject(env, &mut applied, format!("--import {}", file_url(&hook)?));
        }
    } else {
        for spec in package.egg.require_entries() {
            let hook = module_resolver::resolve_module(spec, base_dir, &roots)?;
            inject(
                env,
                &mut applied,
                format!("--require {}", escape_backslashes(&hook)),
            );
        }
    }

    Ok(applied)
}

fn inject(env: &mut LaunchEnv, applied: &mut AppliedLoaders, option: String) {
    if env.append_node_option(&option) {
        applied.options.push(option);
    }
}

/// The compiler override chain: flag, then environment, then the package,
/// then the built-in default for the target's module system.
fn compiler_specifier(
    flag: Option<&str>,
    env: &LaunchEnv,
    package: &PackageJson,
    esm: bool,
) -> String {
    let fallback = if esm { DEFAULT_ESM_LOADER } else { DEFAULT_COMPILER };
    flag.map(str::to_string)
        .or_else(|| env.get(TS_COMPILER_VAR).map(str::to_string))
        .or_else(|| package.egg.tscompiler.clone())
        .unwrap_or_else(|| fallback.to_string())
}

/// Appends one `--security-revert=<id>` flag per declared revert, skipping
/// ids that are already present in the global exec-arg list.
fn apply_reverts(exec_argv: &mut Vec<String>, package: &PackageJson) {
    for id in package.egg.revert_entries() {
        let flag = format!("--security-revert={}", id);
        if exec_argv.contains(&flag) {
            debug!("Skipping duplicate revert directive: {}", id);
            continue;
        }
        exec_argv.push(flag);
    }
}

/// Converts a resolved hook path into a file URL. Mandatory for modern
/// targets, where a bare Windows drive letter would parse as a URL scheme.
fn file_url(path: &Path) -> Result<String, LoaderError> {
    Url::from_file_path(path)
        .map(|url| url.to_string())
        .map_err(|()| LoaderError::FileUrl {
            path: path.display().to_string(),
        })
}

/// Doubles backslashes so the path survives node's re-parse of the composed
/// options variable.
fn escape_backslashes(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

/// Runs the declaration generator from the target's own `node_modules/.bin`,
/// blocking until it finishes. The generated files must exist before the
/// compiler hook loads the app, so this stays synchronous.
fn generate_declarations(base_dir: &Path) -> Result<(), LoaderError> {
    let bin_name = if cfg!(windows) {
        format!("{}.cmd", DECLARATIONS_BIN)
    } else {
        DECLARATIONS_BIN.to_string()
    };
    let bin = base_dir
        .join(NODE_MODULES_DIRNAME)
        .join(".bin")
        .join(bin_name);

    if !bin.is_file() {
        return Err(LoaderError::GeneratorMissing {
            bin: DECLARATIONS_BIN.to_string(),
            dir: bin
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        });
    }

    println!(
        "{} type declarations ({})...",
        "Generating".green().bold(),
        DECLARATIONS_BIN
    );
    let status = StdCommand::new(&bin)
        .current_dir(base_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| LoaderError::GeneratorSpawn {
            bin: DECLARATIONS_BIN.to_string(),
            source: e,
        })?;

    if !status.success() {
        return Err(LoaderError::GeneratorFailed {
            bin: DECLARATIONS_BIN.to_string(),
        });
    }
    Ok(())
}

// MARK: --- UNIT TESTS ---
