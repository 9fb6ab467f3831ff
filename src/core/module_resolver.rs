// src/core/module_resolver.rs

use crate::constants::{NODE_MODULES_DIRNAME, PACKAGE_FILENAME};
use crate::core::paths;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModuleResolveError {
    #[error("Could not resolve module '{specifier}' (searched: {searched}). Is it installed?")]
    NotFound { specifier: String, searched: String },
}

/// The slice of a module's own `package.json` that resolution cares about.
#[derive(Deserialize)]
struct ManifestMain {
    main: Option<String>,
}

/// The standard hook search list, as module roots probed in order:
/// the target application's `node_modules`, the tool's own install root's
/// `node_modules`, and the legacy per-user `~/.node_modules`.
pub fn standard_module_roots(base_dir: &Path) -> Vec<PathBuf> {
    let mut roots = vec![base_dir.join(NODE_MODULES_DIRNAME)];

    match paths::install_root() {
        Ok(root) => roots.push(root.join(NODE_MODULES_DIRNAME)),
        Err(e) => debug!("Skipping the install root during module search: {}", e),
    }

    if let Some(legacy) = paths::legacy_home_modules() {
        roots.push(legacy);
    }
    roots
}

/// Resolves a module specifier (e.g. "ts-node/register", "mocha/bin/_mocha")
/// to a file on disk.
///
/// Specifiers starting with `.` refer to files inside the target application
/// and are probed against `base_dir` directly. Everything else is probed
/// against each module root in order; within one location the candidates
/// are: the exact path, the path with `.js`/`.cjs`/`.mjs` appended, the
/// `main` entry of the module's own manifest, and finally `index.js`.
///
/// Failure is fatal for the caller: a launch must never proceed with a hook
/// it could not find.
pub fn resolve_module(
    specifier: &str,
    base_dir: &Path,
    module_roots: &[PathBuf],
) -> Result<PathBuf, ModuleResolveError> {
    if specifier.starts_with('.') {
        return probe(&base_dir.join(specifier)).ok_or_else(|| ModuleResolveError::NotFound {
            specifier: specifier.to_string(),
            searched: base_dir.display().to_string(),
        });
    }

    for root in module_roots {
        if let Some(path) = probe(&root.join(specifier)) {
            debug!("Resolved module '{}' to '{}'.", specifier, path.display());
            return Ok(path);
        }
    }

    Err(ModuleResolveError::NotFound {
        specifier: specifier.to_string(),
        searched: module_roots
            .iter()
            .map(|root| root.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Probes one candidate location for the file node would actually load.
fn probe(candidate: &Path) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }

    // The extension is appended to the whole name, as node does. A dotted
    // specifier like "file.v2" must probe "file.v2.js", never "file.js".
    if let Some(file_name) = candidate.file_name().and_then(|name| name.to_str()) {
        for ext in ["js", "cjs", "mjs"] {
            let with_ext = candidate.with_file_name(format!("{}.{}", file_name, ext));
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }
    }

    if candidate.is_dir() {
        if let Some(main) = manifest_main(candidate) {
            let main_path = candidate.join(main);
            if main_path.is_file() {
                return Some(main_path);
            }
        }
        let index = candidate.join("index.js");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Reads the `main` field of a module directory's manifest, if any.
/// A missing or malformed manifest just means "no main", never an error.
fn manifest_main(dir: &Path) -> Option<String> {
    let content = std::fs::read_to_string(dir.join(PACKAGE_FILENAME)).ok()?;
    let parsed: ManifestMain = serde_json::from_str(&content).ok()?;
    parsed.main
}
