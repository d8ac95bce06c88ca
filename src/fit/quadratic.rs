//! Quadratic least-squares fit of the critical mass against the coupling.
//!
//! Given pairs `(k_i, m_i)`:
//! - fit `m(k) = a k² + b k + c` (SVD least squares)
//! - vertex `k_peak = -b / (2a)`, `m_peak = m(k_peak)`
//! - `R² = 1 - SS_res / SS_tot` (`1.0` when `SS_tot == 0`)
//!
//! A leading coefficient that is numerically zero makes the vertex undefined;
//! that is reported as a degenerate fit instead of an infinite vertex.

use crate::domain::VertexKind;
use crate::error::{AppError, ErrorKind};
use crate::math::{linspace, polyfit, polyval};

/// Minimum number of valid points for a parabola.
pub const MIN_POINTS: usize = 3;

/// `|a|` at or below this fraction of the largest other coefficient (or 1)
/// counts as zero.
pub const DEGENERATE_REL_TOL: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticFit {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub k_peak: f64,
    pub m_peak: f64,
    pub r2: f64,
}

impl QuadraticFit {
    pub fn coeffs(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    pub fn eval(&self, k: f64) -> f64 {
        polyval(&self.coeffs(), k)
    }

    pub fn vertex_kind(&self) -> VertexKind {
        if self.a < 0.0 {
            VertexKind::Maximum
        } else {
            VertexKind::Minimum
        }
    }

    /// `n` evenly spaced `(k, m(k))` samples over `[k_min, k_max]`.
    pub fn sample_curve(&self, k_min: f64, k_max: f64, n: usize) -> Vec<(f64, f64)> {
        linspace(k_min, k_max, n)
            .into_iter()
            .map(|k| (k, self.eval(k)))
            .collect()
    }
}

/// Fit a parabola through `(k, m)` pairs.
pub fn fit_quadratic(k: &[f64], m: &[f64]) -> Result<QuadraticFit, AppError> {
    if k.len() != m.len() {
        return Err(AppError::data_integrity(format!(
            "Mismatched fit inputs: {} couplings vs {} masses.",
            k.len(),
            m.len()
        )));
    }
    if k.len() < MIN_POINTS {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            format!(
                "Not enough valid points to fit a parabola (valid points: {}, need {MIN_POINTS}).",
                k.len()
            ),
        ));
    }

    let coeffs = polyfit(k, m, 2)
        .ok_or_else(|| AppError::new(ErrorKind::DegenerateFit, "Least-squares solve failed for the parabola."))?;
    let (a, b, c) = (coeffs[0], coeffs[1], coeffs[2]);

    let scale = 1.0f64.max(b.abs()).max(c.abs());
    if a.abs() <= DEGENERATE_REL_TOL * scale {
        return Err(AppError::new(
            ErrorKind::DegenerateFit,
            format!("Degenerate fit: leading coefficient a={a:e} is ~0, so the vertex is undefined."),
        ));
    }

    let k_peak = -b / (2.0 * a);
    let m_peak = polyval(&coeffs, k_peak);
    if !(k_peak.is_finite() && m_peak.is_finite()) {
        return Err(AppError::new(
            ErrorKind::DegenerateFit,
            format!("Degenerate fit: non-finite vertex (k_peak={k_peak}, m_peak={m_peak})."),
        ));
    }

    let fitted: Vec<f64> = k.iter().map(|&x| polyval(&coeffs, x)).collect();
    let r2 = r_squared(m, &fitted);

    Ok(QuadraticFit {
        a,
        b,
        c,
        k_peak,
        m_peak,
        r2,
    })
}

/// Coefficient of determination; `1.0` when the observations have no spread.
pub fn r_squared(observed: &[f64], fitted: &[f64]) -> f64 {
    let n = observed.len() as f64;
    let mean = observed.iter().sum::<f64>() / n;
    let ss_res: f64 = observed
        .iter()
        .zip(fitted)
        .map(|(y, f)| (y - f) * (y - f))
        .sum();
    let ss_tot: f64 = observed.iter().map(|y| (y - mean) * (y - mean)).sum();
    if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 }
}
