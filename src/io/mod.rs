//! Input/output helpers.
//!
//! - scan table CSV write/read (`table`)
//! - JSON datasets, fit summaries and run manifests (`json`)

pub mod json;
pub mod table;

pub use json::*;
pub use table::*;

use std::fs::create_dir_all;
use std::path::Path;

use crate::error::{AppError, ErrorKind};

/// Fail with a `MissingInput` error (and a hint) if `path` is not a file.
pub fn require_file(path: &Path, hint: &str) -> Result<(), AppError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AppError::new(
            ErrorKind::MissingInput,
            format!("Input file not found: '{}'. {hint}", path.display()),
        ))
    }
}

/// Create the parent directory of `path` if needed.
pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => create_dir_all(dir).map_err(|e| {
            AppError::io(format!("Failed to create directory '{}': {e}", dir.display()))
        }),
        _ => Ok(()),
    }
}
