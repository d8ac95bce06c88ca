//! Critical-mass extraction.
//!
//! For each coupling `k_rot`, walk the scanned masses in ascending order and
//! locate the first place where the chosen sector probability crosses `level`.
//! The crossing mass is linearly interpolated between the two bracketing grid
//! masses. Couplings without a crossing produce a null `m_phi_crit`, which the
//! curve fitter skips.

use tracing::debug;

use crate::domain::{CritDataset, CritEntry, ScanRow, Sector};
use crate::error::AppError;
use crate::scan::{MeshCell, ProbabilityMesh};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalOptions {
    pub sector: Sector,
    pub level: f64,
}

impl Default for CriticalOptions {
    fn default() -> Self {
        Self {
            sector: Sector::A,
            level: 0.5,
        }
    }
}

/// Build the `(k_rot, m_phi_crit)` dataset from scan rows.
pub fn critical_curve(rows: &[ScanRow], opts: CriticalOptions) -> Result<CritDataset, AppError> {
    if !(opts.level.is_finite() && (0.0..=1.0).contains(&opts.level)) {
        return Err(AppError::config(format!(
            "Crossing level must be in [0, 1] (got {}).",
            opts.level
        )));
    }

    let mesh = ProbabilityMesh::from_rows(rows, opts.sector)?;
    let data = (0..mesh.couplings.len())
        .map(|j| {
            let k_rot = mesh.couplings[j];
            let m_phi_crit = first_crossing(mesh.column(j), opts.level);
            debug!(k_rot, ?m_phi_crit, "critical mass");
            CritEntry {
                k_rot: Some(k_rot),
                m_phi_crit,
            }
        })
        .collect();

    Ok(CritDataset { data })
}

fn first_crossing(column: impl Iterator<Item = (f64, MeshCell)>, level: f64) -> Option<f64> {
    let mut prev: Option<(f64, f64)> = None;
    for (m, cell) in column {
        let MeshCell::Present(p) = cell else {
            continue;
        };
        if let Some((m0, p0)) = prev {
            let d0 = p0 - level;
            let d1 = p - level;
            if d0 == 0.0 {
                return Some(m0);
            }
            if d0 * d1 <= 0.0 {
                return Some(m0 + (level - p0) * (m - m0) / (p - p0));
            }
        }
        prev = Some((m, p));
    }
    None
}
