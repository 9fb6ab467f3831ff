// src/cli/handlers/commons.rs

// Shared launch-resolution flow used by every child-spawning handler.

use crate::cli::args::RuntimeArgs;
use crate::constants::{DEFAULT_NODE_BIN, EGG_TYPESCRIPT_VAR, TSCONFIG_FILENAME};
use crate::core::launch_env::LaunchEnv;
use crate::core::{loader, modes, package, paths};
use crate::models::{LaunchConfig, PackageJson};
use anyhow::{Context, Result};

/// Everything a handler needs after launch resolution: the frozen config
/// plus the manifest it was derived from.
#[derive(Debug)]
pub struct PreparedLaunch {
    pub config: LaunchConfig,
    pub package: PackageJson,
}

/// Resolves the full launch picture from the shared runtime flags and the
/// calling process environment.
pub fn prepare_launch(args: &RuntimeArgs) -> Result<PreparedLaunch> {
    prepare_launch_with_env(args, LaunchEnv::from_process())
}

/// Same as [`prepare_launch`], but with an explicit starting environment.
/// Tests use this seam so they never touch the real process environment.
pub fn prepare_launch_with_env(args: &RuntimeArgs, mut env: LaunchEnv) -> Result<PreparedLaunch> {
    // 1. Anchor every later path on the target directory.
    let base_dir = paths::expand_base_dir(args.base_dir.as_deref())?;

    // 2. Read the target manifest (a missing one is an empty default).
    let package = package::load(&base_dir)
        .with_context(|| format!("Failed to read the manifest in '{}'", base_dir.display()))?;

    // 3. Fix the three launch modes for the rest of the invocation.
    let overrides = modes::ModeOverrides {
        typescript: args.typescript,
        typescript_legacy: args.ts.clone(),
        declarations: args.declarations,
        tscompiler: args.tscompiler.clone(),
    };
    let tsconfig_present = base_dir.join(TSCONFIG_FILENAME).is_file();
    let resolved = modes::resolve(&overrides, &package, &env, tsconfig_present);

    // 4. Inject hooks and directives into the launch environment.
    let mut exec_argv = Vec::new();
    let applied = loader::apply(
        &mut env,
        &mut exec_argv,
        &resolved,
        &package,
        &base_dir,
        args.tscompiler.as_deref(),
    )
    .with_context(|| format!("Failed to prepare loaders in '{}'", base_dir.display()))?;

    // 5. Children must agree with this process about TypeScript mode.
    if resolved.typescript {
        env.set(EGG_TYPESCRIPT_VAR, "true");
    }

    let config = LaunchConfig {
        base_dir,
        typescript: resolved.typescript,
        esm: resolved.esm,
        declarations: resolved.declarations,
        compiler_register: applied.compiler_register,
        exec_argv,
        loader_options: applied.options,
        env: env.into_map(),
        node_bin: args
            .node
            .clone()
            .unwrap_or_else(|| DEFAULT_NODE_BIN.to_string()),
        dry_run: args.dry_run,
    };

    Ok(PreparedLaunch { config, package })
}

// MARK: --- UNIT TESTS ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NODE_OPTIONS_VAR;
    use std::path::Path;

    fn write_fixture(dir: &Path, manifest: &str, hooks: &[&str]) {
        std::fs::write(dir.join("package.json"), manifest).unwrap();
        for hook in hooks {
            let path = dir.join("node_modules").join(hook);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "// test hook\n").unwrap();
        }
    }

    fn args_for(dir: &Path) -> RuntimeArgs {
        RuntimeArgs {
            base_dir: Some(dir.to_string_lossy().into_owned()),
            ..RuntimeArgs::default()
        }
    }

    #[test]
    fn test_modern_typescript_package_gets_loader_options() {
        // --- Setup: "type": "module" plus a typescript dev dependency ---
        let dir = tempfile::tempdir().unwrap();
        write_fixture(
            dir.path(),
            r#"{ "type": "module", "devDependencies": { "typescript": "^5.0.0" } }"#,
            &["ts-node/esm.mjs", "tsconfig-paths/register.js"],
        );

        // --- Execute ---
        let prepared = prepare_launch_with_env(&args_for(dir.path()), LaunchEnv::new()).unwrap();

        // --- Assert ---
        assert!(prepared.config.typescript);
        assert!(prepared.config.esm);

        let options = prepared.config.env.get(NODE_OPTIONS_VAR).unwrap();
        assert!(options.contains("--loader file://"));
        assert!(options.contains("--import file://"));
        assert!(!options.contains("--require"));

        assert_eq!(
            prepared
                .config
                .env
                .get(EGG_TYPESCRIPT_VAR)
                .map(String::as_str),
            Some("true")
        );
        let compiler = prepared.config.compiler_register.unwrap();
        assert!(compiler.ends_with("ts-node/esm.mjs"));
    }

    #[test]
    fn test_classic_typescript_package_gets_require_options() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(
            dir.path(),
            r#"{ "egg": { "typescript": true } }"#,
            &["ts-node/register.js", "tsconfig-paths/register.js"],
        );

        let prepared = prepare_launch_with_env(&args_for(dir.path()), LaunchEnv::new()).unwrap();

        assert!(prepared.config.typescript);
        assert!(!prepared.config.esm);

        let options = prepared.config.env.get(NODE_OPTIONS_VAR).unwrap();
        assert!(options.contains("--require"));
        assert!(options.contains("ts-node/register.js"));
        assert!(options.contains("tsconfig-paths/register.js"));
        assert!(!options.contains("--loader"));
    }

    #[test]
    fn test_plain_directory_resolves_everything_off() {
        // --- Setup: no manifest at all ---
        let dir = tempfile::tempdir().unwrap();

        // --- Execute ---
        let prepared = prepare_launch_with_env(&args_for(dir.path()), LaunchEnv::new()).unwrap();

        // --- Assert ---
        assert!(!prepared.config.typescript);
        assert!(!prepared.config.esm);
        assert!(!prepared.config.declarations);
        assert_eq!(prepared.config.node_bin, "node");
        assert!(prepared.config.exec_argv.is_empty());
        assert!(prepared.config.loader_options.is_empty());
        assert!(!prepared.config.env.contains_key(EGG_TYPESCRIPT_VAR));
        assert!(prepared.package.name.is_none());
    }

    #[test]
    fn test_explicit_flag_overrides_detection() {
        // --- Setup: a tsconfig.json that would normally switch the mode on ---
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TSCONFIG_FILENAME), "{}").unwrap();

        let args = RuntimeArgs {
            typescript: Some(false),
            dry_run: true,
            node: Some("node-canary".to_string()),
            ..args_for(dir.path())
        };

        // --- Execute ---
        let prepared = prepare_launch_with_env(&args, LaunchEnv::new()).unwrap();

        // --- Assert ---
        assert!(!prepared.config.typescript);
        assert!(prepared.config.dry_run);
        assert_eq!(prepared.config.node_bin, "node-canary");
    }

    #[test]
    fn test_reverts_become_exec_argv_flags() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(
            dir.path(),
            r#"{ "egg": { "revert": "CVE-2023-46809" } }"#,
            &[],
        );

        let prepared = prepare_launch_with_env(&args_for(dir.path()), LaunchEnv::new()).unwrap();

        assert_eq!(
            prepared.config.exec_argv,
            vec!["--security-revert=CVE-2023-46809".to_string()]
        );
    }

    #[test]
    fn test_preexisting_user_options_survive_injection() {
        // --- Setup: the user already exported an interpreter option ---
        let dir = tempfile::tempdir().unwrap();
        write_fixture(
            dir.path(),
            r#"{ "egg": { "typescript": true } }"#,
            &["ts-node/register.js", "tsconfig-paths/register.js"],
        );
        let mut env = LaunchEnv::new();
        env.set(NODE_OPTIONS_VAR, "--max-old-space-size=4096");

        // --- Execute ---
        let prepared = prepare_launch_with_env(&args_for(dir.path()), env).unwrap();

        // --- Assert: appended after, never replaced ---
        let options = prepared.config.env.get(NODE_OPTIONS_VAR).unwrap();
        assert!(options.starts_with("--max-old-space-size=4096"));
        assert!(options.contains("--require"));
    }

    #[test]
    fn test_malformed_manifest_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{ not json").unwrap();

        let result = prepare_launch_with_env(&args_for(dir.path()), LaunchEnv::new());

        assert!(result.is_err());
    }
}
