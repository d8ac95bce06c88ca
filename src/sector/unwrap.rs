//! Phase unwrapping.
//!
//! Integrated phases can be reported modulo 2π, which introduces artificial
//! jumps. Unwrapping adds multiples of 2π so consecutive samples never differ
//! by more than π.
//!
//! Semantics follow the usual `unwrap` convention:
//! - a step with `|Δ| < π` is left untouched
//! - a step of exactly `+π` keeps its sign (it is not folded to `-π`)

use std::f64::consts::{PI, TAU};

/// Return a continuous copy of `phases`.
pub fn unwrap_phase(phases: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phases.len());
    let Some(&first) = phases.first() else {
        return out;
    };
    out.push(first);

    let mut correction = 0.0;
    for w in phases.windows(2) {
        let d = w[1] - w[0];
        let mut d_mod = (d + PI).rem_euclid(TAU) - PI;
        if d_mod == -PI && d > 0.0 {
            d_mod = PI;
        }
        if d.abs() >= PI {
            correction += d_mod - d;
        }
        out.push(w[1] + correction);
    }

    out
}
