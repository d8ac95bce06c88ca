//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during the scan and the fit
//! - exported to JSON/CSV
//! - reloaded later for re-plotting or critical-curve extraction

use std::f64::consts::PI;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::math::linspace;

/// Asymptotic outcome of a phase-difference trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Sector {
    /// Synchrony: the phase difference settles near 0.
    #[value(name = "a")]
    A,
    /// Antipodal: the phase difference settles near π (mod 2π).
    #[value(name = "b")]
    B,
    /// Escape or bounded oscillation: no clear convergence.
    #[value(name = "c")]
    C,
}

impl Sector {
    pub const ALL: [Sector; 3] = [Sector::A, Sector::B, Sector::C];

    pub fn label(self) -> &'static str {
        match self {
            Sector::A => "A",
            Sector::B => "B",
            Sector::C => "C",
        }
    }

    /// Human-readable label for terminal output and figure titles.
    pub fn display_name(self) -> &'static str {
        match self {
            Sector::A => "Synchrony",
            Sector::B => "Antipodal",
            Sector::C => "Escape / oscillatory",
        }
    }
}

/// Per-sector trajectory counts for one grid point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectorCounts {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl SectorCounts {
    pub fn record(&mut self, sector: Sector) {
        match sector {
            Sector::A => self.a += 1,
            Sector::B => self.b += 1,
            Sector::C => self.c += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.a + self.b + self.c
    }

    /// Empirical probabilities `count / total`; all zero when nothing was counted.
    pub fn probabilities(&self) -> [f64; 3] {
        let total = self.total();
        if total == 0 {
            return [0.0; 3];
        }
        let n = total as f64;
        [self.a as f64 / n, self.b as f64 / n, self.c as f64 / n]
    }
}

/// One row of the scan table (one grid point).
///
/// Field names match the CSV header written by `io::table`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRow {
    pub m_phi: f64,
    pub k_rot: f64,
    #[serde(rename = "N_total")]
    pub n_total: usize,
    #[serde(rename = "N_A")]
    pub n_a: usize,
    #[serde(rename = "N_B")]
    pub n_b: usize,
    #[serde(rename = "N_C")]
    pub n_c: usize,
    #[serde(rename = "P_A")]
    pub p_a: f64,
    #[serde(rename = "P_B")]
    pub p_b: f64,
    #[serde(rename = "P_C")]
    pub p_c: f64,
}

impl ScanRow {
    pub fn from_counts(m_phi: f64, k_rot: f64, counts: SectorCounts) -> Self {
        let [p_a, p_b, p_c] = counts.probabilities();
        Self {
            m_phi,
            k_rot,
            n_total: counts.total(),
            n_a: counts.a,
            n_b: counts.b,
            n_c: counts.c,
            p_a,
            p_b,
            p_c,
        }
    }

    pub fn probability(&self, sector: Sector) -> f64 {
        match sector {
            Sector::A => self.p_a,
            Sector::B => self.p_b,
            Sector::C => self.p_c,
        }
    }
}

/// Thresholds used by the sector classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierParams {
    /// Fraction of the trajectory (from the end) treated as asymptotic.
    pub tail_fraction: f64,
    /// Proximity threshold to 0 for sector A.
    pub tol_a: f64,
    /// Proximity threshold to π (mod 2π) for sector B.
    pub tol_b: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            tail_fraction: 0.2,
            tol_a: 0.1,
            tol_b: 0.1,
        }
    }
}

/// Fixed numerical-integration options shared by every trajectory of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationOptions {
    /// Secondary coupling constant.
    pub q: f64,
    /// Initial phase-difference rate.
    pub delta_phidot_ini: f64,
    /// Initial scale factor.
    pub a_ini: f64,
    /// Final scale factor.
    pub a_max: f64,
    /// Number of output samples.
    pub n_steps: usize,
    /// Hubble normalization constant.
    pub h0: f64,
    pub rtol: f64,
    pub atol: f64,
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            q: 1.0,
            delta_phidot_ini: 0.0,
            a_ini: 1e-3,
            a_max: 10.0,
            n_steps: 1500,
            h0: 1.0,
            rtol: 1e-7,
            atol: 1e-9,
        }
    }
}

impl IntegrationOptions {
    pub fn validate(&self) -> Result<(), AppError> {
        let finite = [self.q, self.delta_phidot_ini, self.a_ini, self.a_max, self.h0, self.rtol, self.atol]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(AppError::config("Integration options must be finite."));
        }
        if !(self.a_ini > 0.0 && self.a_max > self.a_ini) {
            return Err(AppError::config(format!(
                "Invalid scale-factor range: a_ini={}, a_max={} (need 0 < a_ini < a_max).",
                self.a_ini, self.a_max
            )));
        }
        if self.n_steps < 2 {
            return Err(AppError::config("n_steps must be >= 2."));
        }
        if self.h0 <= 0.0 {
            return Err(AppError::config(format!("h0 must be > 0 (got {}).", self.h0)));
        }
        if self.rtol <= 0.0 || self.atol <= 0.0 {
            return Err(AppError::config("rtol and atol must be > 0."));
        }
        Ok(())
    }
}

/// Full configuration of a sector-probability scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Mass values `m_phi` (outer loop).
    pub m_grid: Vec<f64>,
    /// Coupling values `k_rot` (inner loop).
    pub k_grid: Vec<f64>,
    /// Initial phase offsets sampled per grid point.
    pub n_delta: usize,
    pub delta_min: f64,
    pub delta_max: f64,
    pub integration: IntegrationOptions,
    pub classifier: ClassifierParams,
    /// Evaluate grid points on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            m_grid: linspace(0.3, 3.0, 7),
            k_grid: linspace(0.0, 0.5, 7),
            n_delta: 40,
            delta_min: 0.0,
            delta_max: PI,
            integration: IntegrationOptions::default(),
            classifier: ClassifierParams::default(),
            parallel: true,
        }
    }
}

impl ScanConfig {
    pub fn grid_len(&self) -> usize {
        self.m_grid.len() * self.k_grid.len()
    }

    /// Initial phase offsets, evenly spaced over `[delta_min, delta_max]`.
    pub fn delta_inis(&self) -> Vec<f64> {
        linspace(self.delta_min, self.delta_max, self.n_delta)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.m_grid.is_empty() || self.k_grid.is_empty() {
            return Err(AppError::config("Mass and coupling grids must be non-empty."));
        }
        if self.m_grid.iter().chain(self.k_grid.iter()).any(|v| !v.is_finite()) {
            return Err(AppError::config("Grid values must be finite."));
        }
        for (name, grid) in [("m_phi", &self.m_grid), ("k_rot", &self.k_grid)] {
            if let Some(v) = first_duplicate(grid) {
                return Err(AppError::config(format!(
                    "Duplicate {name} grid value {v}; each grid value must be unique."
                )));
            }
        }
        if self.n_delta == 0 {
            return Err(AppError::config("n_delta must be >= 1."));
        }
        if !(self.delta_min.is_finite() && self.delta_max.is_finite()) {
            return Err(AppError::config("Initial phase range must be finite."));
        }
        self.integration.validate()
    }
}

/// First value that occurs more than once (`-0.0` and `0.0` count as equal).
fn first_duplicate(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().map(|v| v + 0.0).collect();
    sorted.sort_by(f64::total_cmp);
    sorted.windows(2).find(|w| w[0] == w[1]).map(|w| w[0])
}

/// One `(k_rot, m_phi_crit)` pair of the critical-curve dataset.
///
/// Either value may be null (no threshold crossing found for that coupling).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CritEntry {
    #[serde(default)]
    pub k_rot: Option<f64>,
    #[serde(default)]
    pub m_phi_crit: Option<f64>,
}

/// Critical mass vs coupling dataset (input of the curve fitter).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CritDataset {
    #[serde(default)]
    pub data: Vec<CritEntry>,
}

impl CritDataset {
    /// Valid `(k, m)` pairs, skipping entries with a missing value.
    pub fn valid_pairs(&self) -> (Vec<f64>, Vec<f64>) {
        self.data
            .iter()
            .filter_map(|e| match (e.k_rot, e.m_phi_crit) {
                (Some(k), Some(m)) => Some((k, m)),
                _ => None,
            })
            .unzip()
    }
}

/// Run configuration for `psec fit`.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub plot: bool,
}

/// Whether the fitted parabola opens downward (peak) or upward (trough).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VertexKind {
    Maximum,
    Minimum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParabolaCoeffs {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub form: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitStats {
    pub mean_m_phi_crit: f64,
    pub std_m_phi_crit: f64,
    pub num_points: usize,
}

/// Persisted summary of the quadratic fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub parabola_coeffs: ParabolaCoeffs,
    pub k_peak: f64,
    pub m_phi_peak: f64,
    pub vertex_kind: VertexKind,
    #[serde(rename = "R2")]
    pub r2: f64,
    pub stats: FitStats,
    pub source_file: String,
}

/// Provenance record written next to the scan table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanManifest {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub grid_points: usize,
    pub table_file: String,
    pub config: ScanConfig,
}
