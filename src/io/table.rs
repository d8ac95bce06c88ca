//! Scan results table (CSV).
//!
//! One row per grid point with the header
//! `m_phi,k_rot,N_total,N_A,N_B,N_C,P_A,P_B,P_C`.

use std::fs::File;
use std::path::Path;

use crate::domain::ScanRow;
use crate::error::AppError;
use crate::io::{ensure_parent_dir, require_file};

/// Write scan rows to a CSV file.
pub fn write_scan_csv(path: &Path, rows: &[ScanRow]) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create scan CSV '{}': {e}", path.display())))?;

    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::io(format!("Failed to write scan CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush scan CSV '{}': {e}", path.display())))?;

    Ok(())
}

/// Read scan rows back from a CSV file written by [`write_scan_csv`].
pub fn read_scan_csv(path: &Path) -> Result<Vec<ScanRow>, AppError> {
    require_file(path, "Run `psec scan` first to produce the scan table.")?;
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open scan CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);
    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<ScanRow>().enumerate() {
        // +2: header is line 1.
        let row: ScanRow = result
            .map_err(|e| AppError::io(format!("Invalid scan CSV row at line {}: {e}", idx + 2)))?;
        rows.push(row);
    }
    Ok(rows)
}
