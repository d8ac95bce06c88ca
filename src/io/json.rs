//! JSON files: critical-curve datasets, fit summaries, scan manifests.
//!
//! All writers produce pretty-printed JSON.

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::{CritDataset, FitSummary, ScanManifest};
use crate::error::AppError;
use crate::io::{ensure_parent_dir, require_file};

pub fn write_json<T: Serialize>(path: &Path, value: &T, what: &str) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create {what} '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::io(format!("Failed to write {what}: {e}")))?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open {what} '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::io(format!("Invalid {what}: {e}")))
}

/// Read the `(k_rot, m_phi_crit)` dataset consumed by the curve fitter.
pub fn read_crit_dataset(path: &Path) -> Result<CritDataset, AppError> {
    require_file(
        path,
        "Run `psec critical` on a scan table first to produce the critical-mass dataset.",
    )?;
    read_json(path, "critical-mass JSON")
}

pub fn write_crit_dataset(path: &Path, dataset: &CritDataset) -> Result<(), AppError> {
    write_json(path, dataset, "critical-mass JSON")
}

pub fn write_fit_summary(path: &Path, summary: &FitSummary) -> Result<(), AppError> {
    write_json(path, summary, "fit summary JSON")
}

pub fn write_manifest(path: &Path, manifest: &ScanManifest) -> Result<(), AppError> {
    write_json(path, manifest, "scan manifest")
}
