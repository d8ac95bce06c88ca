//! Asymptotic sector classifier.
//!
//! Given a phase-difference trajectory `Δφ(a)`, the classifier looks at the
//! final portion of the unwrapped signal (the "tail") and decides:
//!
//! - **A** (synchrony): tail mean and spread both below `tol_a` around 0
//! - **B** (antipodal): tail mean within `tol_b` of π (mod 2π) and spread below `tol_b`
//! - **C** (escape / oscillatory): anything else
//!
//! Trajectories shorter than [`MIN_SAMPLES`] are always **C**.

use std::f64::consts::{PI, TAU};

use crate::domain::{ClassifierParams, Sector};
use crate::error::AppError;
use crate::math::{mean, std_dev};
use crate::sector::unwrap_phase;

/// Below this length a trajectory is too short to judge and is labelled C.
pub const MIN_SAMPLES: usize = 10;

/// Lower bound on the tail window size.
pub const MIN_TAIL: usize = 5;

/// Mean and spread of the asymptotic window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailStats {
    pub len: usize,
    pub mean: f64,
    pub std: f64,
}

/// Validated classifier.
#[derive(Debug, Clone, Copy)]
pub struct SectorClassifier {
    params: ClassifierParams,
}

impl Default for SectorClassifier {
    fn default() -> Self {
        Self {
            params: ClassifierParams::default(),
        }
    }
}

impl SectorClassifier {
    pub fn new(params: ClassifierParams) -> Result<Self, AppError> {
        let ClassifierParams {
            tail_fraction,
            tol_a,
            tol_b,
        } = params;
        if !(tail_fraction.is_finite() && tail_fraction > 0.0 && tail_fraction <= 1.0) {
            return Err(AppError::config(format!(
                "tail_fraction must be in (0, 1] (got {tail_fraction})."
            )));
        }
        if !(tol_a.is_finite() && tol_a > 0.0 && tol_b.is_finite() && tol_b > 0.0) {
            return Err(AppError::config(format!(
                "Sector tolerances must be finite and > 0 (tol_a={tol_a}, tol_b={tol_b})."
            )));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> ClassifierParams {
        self.params
    }

    /// Classify a raw (possibly wrapped) phase-difference trajectory.
    ///
    /// Errors on an empty trajectory or, for trajectories long enough to be
    /// judged, on any non-finite sample.
    pub fn classify(&self, delta_phi: &[f64]) -> Result<Sector, AppError> {
        if delta_phi.is_empty() {
            return Err(AppError::data_integrity("Cannot classify an empty trajectory."));
        }
        if delta_phi.len() < MIN_SAMPLES {
            return Ok(Sector::C);
        }
        if let Some(idx) = delta_phi.iter().position(|v| !v.is_finite()) {
            return Err(AppError::data_integrity(format!(
                "Non-finite phase sample at index {idx} (value {}).",
                delta_phi[idx]
            )));
        }

        let stats = self.tail_stats(delta_phi);
        Ok(self.sector_from_tail(&stats))
    }

    /// Tail statistics of the unwrapped trajectory.
    ///
    /// The caller guarantees `delta_phi.len() >= MIN_SAMPLES`.
    pub fn tail_stats(&self, delta_phi: &[f64]) -> TailStats {
        let unwrapped = unwrap_phase(delta_phi);
        let n = unwrapped.len();
        let n_tail = ((n as f64 * self.params.tail_fraction) as usize)
            .max(MIN_TAIL)
            .min(n);
        let tail = &unwrapped[n - n_tail..];
        TailStats {
            len: n_tail,
            mean: mean(tail),
            std: std_dev(tail),
        }
    }

    fn sector_from_tail(&self, tail: &TailStats) -> Sector {
        let ClassifierParams { tol_a, tol_b, .. } = self.params;

        if tail.mean.abs() < tol_a && tail.std < tol_a {
            return Sector::A;
        }

        let wrapped = tail.mean.rem_euclid(TAU);
        let dist_to_pi = (wrapped - PI).abs().min((wrapped - 3.0 * PI).abs());
        if dist_to_pi < tol_b && tail.std < tol_b {
            return Sector::B;
        }

        Sector::C
    }
}

/// Classify with explicit parameters (validating them first).
pub fn classify_sector(delta_phi: &[f64], params: ClassifierParams) -> Result<Sector, AppError> {
    SectorClassifier::new(params)?.classify(delta_phi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classify(v: &[f64]) -> Sector {
        SectorClassifier::default().classify(v).unwrap()
    }

    #[test]
    fn constant_zero_is_synchrony() {
        assert_eq!(classify(&[0.0; 10]), Sector::A);
        assert_eq!(classify(&[0.0; 500]), Sector::A);
    }

    #[test]
    fn tight_oscillation_around_pi_is_antipodal() {
        let v: Vec<f64> = (0..200)
            .map(|i| if i % 2 == 0 { PI + 0.01 } else { PI - 0.01 })
            .collect();
        assert_eq!(classify(&v), Sector::B);
    }

    #[test]
    fn three_pi_counts_as_antipodal() {
        let v = vec![3.0 * PI; 50];
        assert_eq!(classify(&v), Sector::B);
    }

    #[test]
    fn two_pi_is_neither_synchrony_nor_antipodal() {
        let v = vec![TAU; 50];
        assert_eq!(classify(&v), Sector::C);
    }

    #[test]
    fn wide_oscillation_is_escape() {
        let v: Vec<f64> = (0..300).map(|i| (i as f64 * 0.3).sin()).collect();
        assert_eq!(classify(&v), Sector::C);
    }

    #[test]
    fn only_the_tail_matters() {
        // Large transient, then settled at zero for the last 20%.
        let mut v: Vec<f64> = (0..80).map(|i| 2.0 * (i as f64 * 0.7).cos()).collect();
        v.extend(std::iter::repeat(0.0).take(20));
        assert_eq!(classify(&v), Sector::A);
    }

    #[test]
    fn wrapped_drift_is_escape() {
        // A phase that keeps rotating, reported modulo 2π.
        let v: Vec<f64> = (0..200).map(|i| (i as f64 * 0.2).rem_euclid(TAU)).collect();
        assert_eq!(classify(&v), Sector::C);
    }

    #[test]
    fn tail_window_has_a_floor() {
        let c = SectorClassifier::default();
        let stats = c.tail_stats(&[0.0; 12]);
        assert_eq!(stats.len, MIN_TAIL);
        let stats = c.tail_stats(&[0.0; 100]);
        assert_eq!(stats.len, 20);
    }

    #[test]
    fn empty_trajectory_is_an_error() {
        let err = SectorClassifier::default().classify(&[]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DataIntegrity);
    }

    #[test]
    fn non_finite_sample_is_an_error() {
        let mut v = vec![0.0; 20];
        v[7] = f64::NAN;
        assert!(SectorClassifier::default().classify(&v).is_err());
    }

    #[test]
    fn invalid_params_are_rejected() {
        let bad = ClassifierParams {
            tail_fraction: 0.0,
            ..ClassifierParams::default()
        };
        assert!(SectorClassifier::new(bad).is_err());
        let bad = ClassifierParams {
            tol_b: -1.0,
            ..ClassifierParams::default()
        };
        assert!(classify_sector(&[0.0; 20], bad).is_err());
    }

    proptest! {
        #[test]
        fn short_trajectories_are_always_escape(v in prop::collection::vec(-1e3f64..1e3, 1..10)) {
            prop_assert_eq!(classify(&v), Sector::C);
        }

        #[test]
        fn settled_near_zero_is_synchrony(noise in prop::collection::vec(-0.05f64..0.05, 10..200)) {
            prop_assert_eq!(classify(&noise), Sector::A);
        }
    }
}
