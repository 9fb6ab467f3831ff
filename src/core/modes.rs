// src/core/modes.rs

use crate::constants::EGG_TYPESCRIPT_VAR;
use crate::core::launch_env::LaunchEnv;
use crate::models::{PackageJson, ResolvedModes};
use log::debug;

/// Caller-supplied overrides for mode resolution, straight from the CLI.
#[derive(Debug, Clone, Default)]
pub struct ModeOverrides {
    /// `--typescript[=<BOOL>]`: the explicit switch, beats everything.
    pub typescript: Option<bool>,
    /// `--ts <true|false>`: the legacy string spelling. Values other than
    /// "true"/"false" are ignored and resolution falls through.
    pub typescript_legacy: Option<String>,
    /// `--declarations[=<BOOL>]`.
    pub declarations: Option<bool>,
    /// `--tscompiler <SPECIFIER>`: choosing a compiler implies TypeScript.
    pub tscompiler: Option<String>,
}

/// A ranked resolution source: a label for the debug trace plus a closure
/// that either produces a verdict or abstains.
type Source<'a> = (&'static str, &'a dyn Fn() -> Option<bool>);

/// Walks an ordered source chain and returns the first verdict together
/// with the label of the source that produced it.
fn first_match(sources: &[Source<'_>]) -> Option<(&'static str, bool)> {
    sources
        .iter()
        .find_map(|(label, source)| source().map(|value| (*label, value)))
}

fn decide(mode: &str, sources: &[Source<'_>]) -> bool {
    match first_match(sources) {
        Some((label, value)) => {
            debug!("{} mode resolved to {} (source: {}).", mode, value, label);
            value
        }
        None => {
            debug!("{} mode defaulted to false: no source had a verdict.", mode);
            false
        }
    }
}

/// Interprets a string switch. Only the exact spellings "true" and "false"
/// count; anything else abstains so the next source gets a say.
fn parse_bool(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

/// Resolves the three launch-mode booleans.
///
/// Pure by construction: every input is passed in (the tsconfig probe is done
/// by the caller) and a chain with no verdict degrades to `false`, never to
/// an error. The order of each chain is part of the tool's contract.
pub fn resolve(
    overrides: &ModeOverrides,
    package: &PackageJson,
    env: &LaunchEnv,
    tsconfig_present: bool,
) -> ResolvedModes {
    let ts_flag = || overrides.typescript;
    let ts_legacy = || parse_bool(overrides.typescript_legacy.as_deref());
    let ts_env = || parse_bool(env.get(EGG_TYPESCRIPT_VAR));
    let ts_package = || package.egg.typescript;
    let ts_dependency = || package.depends_on("typescript").then_some(true);
    let ts_config_file = || tsconfig_present.then_some(true);
    let ts_compiler_flag = || overrides.tscompiler.is_some().then_some(true);

    let typescript = decide(
        "TypeScript",
        &[
            ("--typescript flag", &ts_flag),
            ("--ts legacy flag", &ts_legacy),
            ("EGG_TYPESCRIPT variable", &ts_env),
            ("package egg.typescript", &ts_package),
            ("typescript dependency", &ts_dependency),
            ("tsconfig.json present", &ts_config_file),
            ("--tscompiler flag", &ts_compiler_flag),
        ],
    );

    let decl_flag = || overrides.declarations;
    let decl_package = || package.egg.declarations;

    let declarations = decide(
        "Declarations",
        &[
            ("--declarations flag", &decl_flag),
            ("package egg.declarations", &decl_package),
        ],
    );

    // The module system is declared, never inferred: only the package's own
    // "type" marker selects modern loading.
    let esm = package.is_module();
    debug!(
        "Modern-module mode is {} (package \"type\" = {:?}).",
        esm, package.module_type
    );

    ResolvedModes {
        typescript,
        esm,
        declarations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package_from(json: &str) -> PackageJson {
        serde_json::from_str(json).unwrap()
    }

    fn env_with_egg_typescript(value: &str) -> LaunchEnv {
        let mut env = LaunchEnv::new();
        env.set(EGG_TYPESCRIPT_VAR, value);
        env
    }

    #[test]
    fn test_explicit_flag_beats_every_other_source() {
        // --- Setup ---
        let overrides = ModeOverrides {
            typescript: Some(false),
            ..Default::default()
        };
        let package = package_from(r#"{ "egg": { "typescript": true } }"#);
        let env = env_with_egg_typescript("true");

        // --- Execute ---
        let modes = resolve(&overrides, &package, &env, true);

        // --- Assert ---
        assert!(!modes.typescript);
    }

    #[test]
    fn test_legacy_flag_beats_environment() {
        let overrides = ModeOverrides {
            typescript_legacy: Some("false".to_string()),
            ..Default::default()
        };
        let env = env_with_egg_typescript("true");

        let modes = resolve(&overrides, &PackageJson::default(), &env, false);

        assert!(!modes.typescript);
    }

    #[test]
    fn test_unparseable_legacy_flag_falls_through() {
        let overrides = ModeOverrides {
            typescript_legacy: Some("yes".to_string()),
            ..Default::default()
        };
        let env = env_with_egg_typescript("true");

        let modes = resolve(&overrides, &PackageJson::default(), &env, false);

        assert!(modes.typescript);
    }

    #[test]
    fn test_invalid_environment_value_falls_through() {
        // "1" is not a recognized spelling; the package verdict applies.
        let env = env_with_egg_typescript("1");
        let package = package_from(
            r#"{ "egg": { "typescript": false }, "dependencies": { "typescript": "*" } }"#,
        );

        let modes = resolve(&ModeOverrides::default(), &package, &env, true);

        assert!(!modes.typescript);
    }

    #[test]
    fn test_environment_false_beats_dependency_detection() {
        let env = env_with_egg_typescript("false");
        let package = package_from(r#"{ "devDependencies": { "typescript": "^5" } }"#);

        let modes = resolve(&ModeOverrides::default(), &package, &env, true);

        assert!(!modes.typescript);
    }

    #[test]
    fn test_dev_dependency_enables_typescript() {
        let package = package_from(r#"{ "devDependencies": { "typescript": "^5" } }"#);

        let modes = resolve(&ModeOverrides::default(), &package, &LaunchEnv::new(), false);

        assert!(modes.typescript);
    }

    #[test]
    fn test_tsconfig_presence_is_the_last_detection() {
        let modes = resolve(
            &ModeOverrides::default(),
            &PackageJson::default(),
            &LaunchEnv::new(),
            true,
        );

        assert!(modes.typescript);
    }

    #[test]
    fn test_compiler_flag_implies_typescript() {
        let overrides = ModeOverrides {
            tscompiler: Some("esbuild-register".to_string()),
            ..Default::default()
        };

        let modes = resolve(&overrides, &PackageJson::default(), &LaunchEnv::new(), false);

        assert!(modes.typescript);
    }

    #[test]
    fn test_everything_absent_defaults_to_false() {
        let modes = resolve(
            &ModeOverrides::default(),
            &PackageJson::default(),
            &LaunchEnv::new(),
            false,
        );

        assert!(!modes.typescript);
        assert!(!modes.esm);
        assert!(!modes.declarations);
    }

    #[test]
    fn test_declarations_flag_beats_package() {
        let overrides = ModeOverrides {
            declarations: Some(false),
            ..Default::default()
        };
        let package = package_from(r#"{ "egg": { "declarations": true } }"#);

        let modes = resolve(&overrides, &package, &LaunchEnv::new(), false);

        assert!(!modes.declarations);
    }

    #[test]
    fn test_declarations_from_package() {
        let package = package_from(r#"{ "egg": { "declarations": true } }"#);

        let modes = resolve(&ModeOverrides::default(), &package, &LaunchEnv::new(), false);

        assert!(modes.declarations);
    }

    #[test]
    fn test_module_type_selects_modern_loading() {
        let package = package_from(r#"{ "type": "module" }"#);
        let modes = resolve(&ModeOverrides::default(), &package, &LaunchEnv::new(), false);
        assert!(modes.esm);

        let package = package_from(r#"{ "type": "commonjs" }"#);
        let modes = resolve(&ModeOverrides::default(), &package, &LaunchEnv::new(), false);
        assert!(!modes.esm);
    }

    #[test]
    fn test_esm_package_with_typescript_dev_dependency() {
        // The common modern layout: "type": "module" plus typescript in
        // devDependencies resolves to compiled, modern-module mode.
        let package =
            package_from(r#"{ "type": "module", "devDependencies": { "typescript": "^5" } }"#);

        let modes = resolve(&ModeOverrides::default(), &package, &LaunchEnv::new(), false);

        assert!(modes.typescript);
        assert!(modes.esm);
    }
}
