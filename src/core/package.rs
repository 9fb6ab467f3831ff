// src/core/package.rs

use crate::constants::PACKAGE_FILENAME;
use crate::models::PackageJson;
use log::debug;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads the target application's `package.json` from `dir`.
///
/// A missing manifest is not an error: resolution simply degrades to an
/// empty descriptor. A manifest that exists but does not parse is fatal,
/// since silently ignoring it would launch the app in the wrong mode.
pub fn load(dir: &Path) -> Result<PackageJson, PackageError> {
    let path = dir.join(PACKAGE_FILENAME);
    if !path.is_file() {
        debug!(
            "No '{}' found in '{}', using an empty descriptor.",
            PACKAGE_FILENAME,
            dir.display()
        );
        return Ok(PackageJson::default());
    }

    let content = fs::read_to_string(&path).map_err(|e| PackageError::Read {
        path: path.display().to_string(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| PackageError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}
