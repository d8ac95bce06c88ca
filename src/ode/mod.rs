//! Phase-difference trajectory integration.
//!
//! The scan driver only depends on the [`PhaseIntegrator`] capability: given a
//! [`PhaseRequest`] it must return three aligned sequences (scale factor, phase
//! difference, phase rate). This keeps the driver testable against stub
//! integrators with analytic trajectories.
//!
//! - [`dopri`]: adaptive Dormand–Prince 5(4) stepper
//! - [`model`]: the default Hubble-damped phase-difference model

pub mod dopri;
pub mod model;

pub use dopri::*;
pub use model::*;

use crate::domain::IntegrationOptions;
use crate::error::AppError;

/// Everything an integrator needs to produce one trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseRequest {
    pub m_phi: f64,
    pub k_rot: f64,
    pub q: f64,
    pub delta_phi_ini: f64,
    pub delta_phidot_ini: f64,
    pub a_ini: f64,
    pub a_max: f64,
    pub n_steps: usize,
    pub h0: f64,
    pub rtol: f64,
    pub atol: f64,
}

impl PhaseRequest {
    pub fn new(m_phi: f64, k_rot: f64, delta_phi_ini: f64, opts: &IntegrationOptions) -> Self {
        Self {
            m_phi,
            k_rot,
            q: opts.q,
            delta_phi_ini,
            delta_phidot_ini: opts.delta_phidot_ini,
            a_ini: opts.a_ini,
            a_max: opts.a_max,
            n_steps: opts.n_steps,
            h0: opts.h0,
            rtol: opts.rtol,
            atol: opts.atol,
        }
    }
}

/// One integrated trajectory: aligned samples over the scale factor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhaseTrajectory {
    pub a: Vec<f64>,
    pub delta_phi: Vec<f64>,
    pub delta_phidot: Vec<f64>,
}

impl PhaseTrajectory {
    pub fn len(&self) -> usize {
        self.delta_phi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delta_phi.is_empty()
    }

    /// Reject misaligned or non-finite output before it reaches the classifier.
    pub fn validate(&self) -> Result<(), AppError> {
        let n = self.delta_phi.len();
        if self.a.len() != n || self.delta_phidot.len() != n {
            return Err(AppError::data_integrity(format!(
                "Integrator returned misaligned sequences (a={}, delta_phi={}, delta_phidot={}).",
                self.a.len(),
                n,
                self.delta_phidot.len()
            )));
        }
        for (name, series) in [
            ("a", &self.a),
            ("delta_phi", &self.delta_phi),
            ("delta_phidot", &self.delta_phidot),
        ] {
            if let Some(idx) = series.iter().position(|v| !v.is_finite()) {
                return Err(AppError::data_integrity(format!(
                    "Integrator returned a non-finite {name} sample at index {idx}."
                )));
            }
        }
        Ok(())
    }
}

/// Capability to integrate a phase-difference trajectory.
///
/// `Sync` so grid points can be evaluated in parallel.
pub trait PhaseIntegrator: Sync {
    fn integrate(&self, request: &PhaseRequest) -> Result<PhaseTrajectory, AppError>;
}

impl<F> PhaseIntegrator for F
where
    F: Fn(&PhaseRequest) -> Result<PhaseTrajectory, AppError> + Sync,
{
    fn integrate(&self, request: &PhaseRequest) -> Result<PhaseTrajectory, AppError> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_misaligned() {
        let t = PhaseTrajectory {
            a: vec![1.0, 2.0],
            delta_phi: vec![0.0, 0.0],
            delta_phidot: vec![0.0],
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite() {
        let t = PhaseTrajectory {
            a: vec![1.0, 2.0],
            delta_phi: vec![0.0, f64::INFINITY],
            delta_phidot: vec![0.0, 0.0],
        };
        let err = t.validate().unwrap_err();
        assert!(err.message().contains("delta_phi"));
    }

    #[test]
    fn closures_are_integrators() {
        let stub = |req: &PhaseRequest| -> Result<PhaseTrajectory, AppError> {
            Ok(PhaseTrajectory {
                a: vec![req.a_ini; req.n_steps],
                delta_phi: vec![req.delta_phi_ini; req.n_steps],
                delta_phidot: vec![0.0; req.n_steps],
            })
        };
        let req = PhaseRequest::new(1.0, 0.0, 0.5, &IntegrationOptions::default());
        let out = stub.integrate(&req).unwrap();
        assert_eq!(out.len(), 1500);
        assert!(out.validate().is_ok());
    }
}
