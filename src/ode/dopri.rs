//! Adaptive Dormand–Prince 5(4) integrator.
//!
//! Explicit embedded Runge–Kutta pair with FSAL (first-same-as-last) reuse of
//! the final stage. The step size is controlled by the mixed error norm
//!
//! ```text
//! err = sqrt(mean_i((e_i / (atol + rtol * max(|y_i|, |y_new_i|)))^2))
//! ```
//!
//! and a step is accepted when `err <= 1`.

use crate::error::AppError;

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (also the last stage row).
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between 5th- and 4th-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

/// Step-size controller settings.
#[derive(Debug, Clone, Copy)]
pub struct Dopri5 {
    pub rtol: f64,
    pub atol: f64,
    /// Hard cap on attempted steps per `advance` call.
    pub max_steps: usize,
}

impl Dopri5 {
    pub fn new(rtol: f64, atol: f64) -> Self {
        Self {
            rtol,
            atol,
            max_steps: 1_000_000,
        }
    }

    /// Advance `y` from `t` to `t_end`.
    ///
    /// `h` is the trial step on entry and the last accepted step size on exit,
    /// so consecutive calls continue with a tuned step.
    pub fn advance<const N: usize, F>(
        &self,
        f: &F,
        t: f64,
        y: &mut [f64; N],
        t_end: f64,
        h: &mut f64,
    ) -> Result<(), AppError>
    where
        F: Fn(f64, &[f64; N]) -> [f64; N],
    {
        let span = t_end - t;
        if span <= 0.0 {
            return Ok(());
        }

        let mut t = t;
        let mut k1 = eval(f, t, y)?;
        if !(h.is_finite() && *h > 0.0) {
            *h = span * 1e-3;
        }

        let mut steps = 0usize;
        while t < t_end {
            steps += 1;
            if steps > self.max_steps {
                return Err(AppError::integrator(format!(
                    "Exceeded {} steps while integrating to {t_end}.",
                    self.max_steps
                )));
            }

            let remaining = t_end - t;
            let last = *h >= remaining;
            let step = if last { remaining } else { *h };
            let h_min = 16.0 * f64::EPSILON * t.abs().max(1.0);
            if step < h_min && !last {
                return Err(AppError::integrator(format!(
                    "Step size underflow at t={t} (h={step:e})."
                )));
            }

            let (y_new, k7, err) = self.trial_step(f, t, y, &k1, step)?;

            if err <= 1.0 {
                t = if last { t_end } else { t + step };
                *y = y_new;
                k1 = k7;
                let factor = if err == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                // Don't let a short final step shrink the carried step size.
                if !last {
                    *h = step * factor;
                }
            } else {
                let factor = (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, 1.0);
                *h = step * factor;
            }
        }

        Ok(())
    }

    fn trial_step<const N: usize, F>(
        &self,
        f: &F,
        t: f64,
        y: &[f64; N],
        k1: &[f64; N],
        h: f64,
    ) -> Result<([f64; N], [f64; N], f64), AppError>
    where
        F: Fn(f64, &[f64; N]) -> [f64; N],
    {
        let stage = |coeffs: &[(f64, &[f64; N])]| {
            let mut out = *y;
            for (c, k) in coeffs {
                for i in 0..N {
                    out[i] += h * c * k[i];
                }
            }
            out
        };

        let k2 = eval(f, t + C2 * h, &stage(&[(A21, k1)]))?;
        let k3 = eval(f, t + C3 * h, &stage(&[(A31, k1), (A32, &k2)]))?;
        let k4 = eval(f, t + C4 * h, &stage(&[(A41, k1), (A42, &k2), (A43, &k3)]))?;
        let k5 = eval(
            f,
            t + C5 * h,
            &stage(&[(A51, k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
        )?;
        let k6 = eval(
            f,
            t + h,
            &stage(&[(A61, k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)]),
        )?;
        let y_new = stage(&[(B1, k1), (B3, &k3), (B4, &k4), (B5, &k5), (B6, &k6)]);
        let k7 = eval(f, t + h, &y_new)?;

        let mut sum = 0.0;
        for i in 0..N {
            let e = h * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
            let scale = self.atol + self.rtol * y[i].abs().max(y_new[i].abs());
            sum += (e / scale) * (e / scale);
        }
        let err = (sum / N as f64).sqrt();

        Ok((y_new, k7, err))
    }
}

fn eval<const N: usize, F>(f: &F, t: f64, y: &[f64; N]) -> Result<[f64; N], AppError>
where
    F: Fn(f64, &[f64; N]) -> [f64; N],
{
    let dy = f(t, y);
    if dy.iter().all(|v| v.is_finite()) {
        Ok(dy)
    } else {
        Err(AppError::integrator(format!("Non-finite derivative at t={t}.")))
    }
}
