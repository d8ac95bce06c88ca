//! Fit summary record.

use crate::domain::{CritDataset, FitStats, FitSummary, ParabolaCoeffs};
use crate::error::AppError;
use crate::fit::{QuadraticFit, fit_quadratic};
use crate::math::{mean, std_dev};

pub const PARABOLA_FORM: &str = "m_phi_crit(k) = a*k^2 + b*k + c";

/// Everything produced by one `psec fit` run.
#[derive(Debug, Clone)]
pub struct FitOutput {
    pub k_rot: Vec<f64>,
    pub m_phi_crit: Vec<f64>,
    pub fit: QuadraticFit,
    pub summary: FitSummary,
}

/// Fit the valid pairs of `dataset` and assemble the persisted summary.
pub fn summarize(dataset: &CritDataset, source_file: &str) -> Result<FitOutput, AppError> {
    let (k_rot, m_phi_crit) = dataset.valid_pairs();
    let fit = fit_quadratic(&k_rot, &m_phi_crit)?;

    let summary = FitSummary {
        parabola_coeffs: ParabolaCoeffs {
            a: fit.a,
            b: fit.b,
            c: fit.c,
            form: PARABOLA_FORM.to_string(),
        },
        k_peak: fit.k_peak,
        m_phi_peak: fit.m_peak,
        vertex_kind: fit.vertex_kind(),
        r2: fit.r2,
        stats: FitStats {
            mean_m_phi_crit: mean(&m_phi_crit),
            std_m_phi_crit: std_dev(&m_phi_crit),
            num_points: k_rot.len(),
        },
        source_file: source_file.to_string(),
    };

    Ok(FitOutput {
        k_rot,
        m_phi_crit,
        fit,
        summary,
    })
}
