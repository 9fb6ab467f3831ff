// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

// --- `package.json` MODELS (What is read from the target application) ---

/// A directive value that may be written as a single string or a list.
/// Uses `untagged` so both spellings deserialize transparently.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum OneOrMany {
    Many(Vec<String>),
    One(String),
}

impl OneOrMany {
    /// Flattens the value into an ordered list of entries.
    pub fn entries(&self) -> Vec<&str> {
        match self {
            Self::Many(list) => list.iter().map(String::as_str).collect(),
            Self::One(single) => vec![single.as_str()],
        }
    }
}

/// The `egg` object of a `package.json`: launch directives declared by the
/// target application itself.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct EggOptions {
    /// Extra register hooks, injected as `--require` on classic targets.
    pub require: Option<OneOrMany>,
    /// Extra loader hooks, injected as `--import` on modern targets.
    pub import: Option<OneOrMany>,
    pub typescript: Option<bool>,
    pub declarations: Option<bool>,
    /// Security patch reverts, one `--security-revert=<id>` flag each.
    pub revert: Option<OneOrMany>,
    /// Compiler register hook override (e.g. "esbuild-register").
    pub tscompiler: Option<String>,
}

impl EggOptions {
    pub fn require_entries(&self) -> Vec<&str> {
        self.require.as_ref().map(OneOrMany::entries).unwrap_or_default()
    }

    pub fn import_entries(&self) -> Vec<&str> {
        self.import.as_ref().map(OneOrMany::entries).unwrap_or_default()
    }

    pub fn revert_entries(&self) -> Vec<&str> {
        self.revert.as_ref().map(OneOrMany::entries).unwrap_or_default()
    }
}

/// The deserialized subset of a target's `package.json` that launch
/// resolution cares about. Unknown fields are ignored.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct PackageJson {
    pub name: Option<String>,

    /// The declared module system. "module" selects modern (ESM) loading.
    #[serde(rename = "type")]
    pub module_type: Option<String>,

    /// The entry module, used by `dev` when no `--entry` flag is given.
    pub main: Option<String>,

    #[serde(default)]
    pub dependencies: HashMap<String, String>,

    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: HashMap<String, String>,

    #[serde(default)]
    pub egg: EggOptions,
}

impl PackageJson {
    /// Whether the package declares the modern (import/export) module system.
    pub fn is_module(&self) -> bool {
        self.module_type.as_deref() == Some("module")
    }

    /// Presence check across `dependencies` and `devDependencies`.
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }
}

// --- IN-MEMORY MODELS (Our internal working representation) ---

/// The three launch-mode booleans, fixed for the lifetime of one invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedModes {
    /// Run the target's source through a compile step before execution.
    pub typescript: bool,
    /// The target uses import/export loading semantics.
    pub esm: bool,
    /// Regenerate declaration files before launching.
    pub declarations: bool,
}

/// The final, frozen view of one launch.
/// Built once by `cli::handlers::commons::prepare_launch` and never mutated
/// afterwards; every spawn in the invocation reads from it.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Absolute directory of the target application.
    pub base_dir: PathBuf,
    pub typescript: bool,
    pub esm: bool,
    pub declarations: bool,
    /// The resolved compiler hook module, when TypeScript mode is on.
    pub compiler_register: Option<PathBuf>,
    /// Interpreter flags applied to every spawn (e.g. security reverts).
    pub exec_argv: Vec<String>,
    /// The loader options that were appended to the composed options variable,
    /// in injection order. Kept for diagnostics; the authoritative copy lives
    /// in `env[NODE_OPTIONS]`.
    pub loader_options: Vec<String>,
    /// The accumulated environment applied to spawned children.
    pub env: HashMap<String, String>,
    /// The interpreter binary to spawn.
    pub node_bin: String,
    /// Print the composed command instead of spawning.
    pub dry_run: bool,
}
