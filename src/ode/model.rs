//! Default phase-difference model.
//!
//! The relative phase `x = Δφ` of two oscillating fields in a radiation-era
//! background obeys
//!
//! ```text
//! ẍ + 3 H ẋ + V'(x) = 0,   V(x) = m² (1 - cos x) + (k q / 4) (1 - cos 2x)
//! H(a) = h0 / a²
//! ```
//!
//! With the scale factor as integration variable (`d/dt = a H d/da`) and
//! `v = ẋ` the state `(x, v)` evolves as
//!
//! ```text
//! dx/da = v a / h0
//! dv/da = -3 v / a - V'(x) a / h0
//! ```
//!
//! `x = 0` is always a minimum. `x = π` becomes a local minimum once
//! `k q > m²`, which is what opens the antipodal sector.

use tracing::trace;

use crate::error::AppError;
use crate::math::linspace;
use crate::ode::{Dopri5, PhaseIntegrator, PhaseRequest, PhaseTrajectory};

/// Hubble-damped phase-difference integrator (adaptive Dormand–Prince).
#[derive(Debug, Clone, Copy, Default)]
pub struct HubbleDampedPhase;

impl HubbleDampedPhase {
    /// `V'(x)` for the given mass and effective coupling `k q`.
    pub fn potential_slope(x: f64, m_phi: f64, coupling: f64) -> f64 {
        m_phi * m_phi * x.sin() + 0.5 * coupling * (2.0 * x).sin()
    }
}

impl PhaseIntegrator for HubbleDampedPhase {
    fn integrate(&self, req: &PhaseRequest) -> Result<PhaseTrajectory, AppError> {
        if !(req.a_ini > 0.0 && req.a_max > req.a_ini && req.h0 > 0.0) {
            return Err(AppError::config(format!(
                "Invalid integration bounds: a_ini={}, a_max={}, h0={}.",
                req.a_ini, req.a_max, req.h0
            )));
        }
        if req.n_steps < 2 {
            return Err(AppError::config("n_steps must be >= 2."));
        }

        let m_phi = req.m_phi;
        let coupling = req.k_rot * req.q;
        let h0 = req.h0;
        let rhs = move |a: f64, y: &[f64; 2]| {
            let [x, v] = *y;
            [
                v * a / h0,
                -3.0 * v / a - Self::potential_slope(x, m_phi, coupling) * a / h0,
            ]
        };

        let solver = Dopri5::new(req.rtol, req.atol);
        let grid = linspace(req.a_ini, req.a_max, req.n_steps);

        let mut out = PhaseTrajectory {
            a: Vec::with_capacity(grid.len()),
            delta_phi: Vec::with_capacity(grid.len()),
            delta_phidot: Vec::with_capacity(grid.len()),
        };

        let mut y = [req.delta_phi_ini, req.delta_phidot_ini];
        let mut h = 0.0;
        let mut a_prev = req.a_ini;
        for &a in &grid {
            solver
                .advance(&rhs, a_prev, &mut y, a, &mut h)
                .map_err(|e| {
                    AppError::integrator(format!(
                        "m_phi={m_phi}, k_rot={}, delta_phi_ini={}: {e}",
                        req.k_rot, req.delta_phi_ini
                    ))
                })?;
            out.a.push(a);
            out.delta_phi.push(y[0]);
            out.delta_phidot.push(y[1]);
            a_prev = a;
        }

        trace!(
            m_phi,
            k_rot = req.k_rot,
            delta_phi_ini = req.delta_phi_ini,
            final_delta_phi = y[0],
            "integrated trajectory"
        );

        Ok(out)
    }
}
