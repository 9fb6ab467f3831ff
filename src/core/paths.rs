// src/core/paths.rs

use crate::constants::LEGACY_MODULES_DIRNAME;
use anyhow::{Result, anyhow};
use lazy_static::lazy_static;
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref INSTALL_ROOT: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not locate the running executable: {0}")]
    ExecutableLookup(#[source] std::io::Error),
    #[error("The running executable has no parent directory.")]
    ExecutableOrphan,
}

/// Returns the directory the running binary lives in.
///
/// Hooks shipped alongside the tool (rather than inside the target app) are
/// resolved relative to this directory.
///
/// This function is memoized: the first call does the executable lookup,
/// subsequent calls return the cached value instantly.
pub fn install_root() -> Result<PathBuf, PathError> {
    // Acquire a lock on the cached path. This is a fast operation if not contended.
    let mut cached_path_guard = INSTALL_ROOT.lock().unwrap();

    if let Some(path) = &*cached_path_guard {
        return Ok(path.clone());
    }

    // --- Cache miss: compute the path for the first time ---
    let exe = env::current_exe().map_err(PathError::ExecutableLookup)?;
    let root = exe.parent().ok_or(PathError::ExecutableOrphan)?;
    let root = dunce::simplified(root).to_path_buf();

    *cached_path_guard = Some(root.clone());
    Ok(root)
}

/// The per-user fallback module directory (`~/.node_modules`), a legacy
/// location node still consults. `None` when no home directory is known.
pub fn legacy_home_modules() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LEGACY_MODULES_DIRNAME))
}

/// Expands a user-supplied base directory flag into an absolute path.
///
/// Resolves the home directory (`~`) and environment variables via
/// `shellexpand::full`, anchors relative paths at the current working
/// directory, and strips Windows UNC noise. With no flag, the current
/// working directory is the base.
pub fn expand_base_dir(raw: Option<&str>) -> Result<PathBuf> {
    let cwd = env::current_dir()
        .map_err(|e| anyhow!("Could not determine the current directory: {}", e))?;

    let Some(raw) = raw else {
        return Ok(dunce::simplified(&cwd).to_path_buf());
    };

    let expanded = shellexpand::full(raw)
        .map_err(|e| anyhow!("Failed to expand base directory '{}': {}", raw, e))?;
    let path = PathBuf::from(expanded.into_owned());

    let absolute = if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    };
    Ok(dunce::simplified(&absolute).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_root_is_memoized() {
        let first = install_root().unwrap();
        let second = install_root().unwrap();

        assert!(first.is_dir());
        assert_eq!(first, second);
    }

    #[test]
    fn test_legacy_home_modules_location() {
        if let Some(path) = legacy_home_modules() {
            assert!(path.ends_with(LEGACY_MODULES_DIRNAME));
        }
    }

    #[test]
    fn test_expand_base_dir_defaults_to_cwd() {
        let resolved = expand_base_dir(None).unwrap();
        let cwd = env::current_dir().unwrap();

        assert_eq!(resolved, dunce::simplified(&cwd).to_path_buf());
    }

    #[test]
    fn test_expand_base_dir_anchors_relative_paths() {
        let resolved = expand_base_dir(Some("fixtures/app")).unwrap();

        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("fixtures/app"));
    }

    #[test]
    fn test_expand_base_dir_resolves_home() {
        if let Some(home) = dirs::home_dir() {
            let resolved = expand_base_dir(Some("~")).unwrap();
            assert_eq!(resolved, dunce::simplified(&home).to_path_buf());
        }
    }
}
