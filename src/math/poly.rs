//! Polynomial helpers.
//!
//! Coefficients are stored highest power first, so `[a, b, c]` means
//! `a x^2 + b x + c`.

use nalgebra::{DMatrix, DVector};

use crate::math::solve_least_squares;

/// Evaluate a polynomial with Horner's scheme.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Least-squares polynomial fit of the given degree.
///
/// Returns `None` when the inputs are mismatched, too short for the degree, or
/// the design matrix cannot be solved.
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = x.len();
    let cols = degree + 1;
    if n != y.len() || n < cols {
        return None;
    }

    let mut design = DMatrix::<f64>::zeros(n, cols);
    for (i, &xi) in x.iter().enumerate() {
        let mut power = 1.0;
        for j in (0..cols).rev() {
            design[(i, j)] = power;
            power *= xi;
        }
    }
    let target = DVector::from_column_slice(y);

    let beta = solve_least_squares(&design, &target)?;
    Some(beta.iter().copied().collect())
}

/// `n` evenly spaced values from `start` to `stop` (inclusive).
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as f64 - 1.0);
            (0..n)
                .map(|i| if i + 1 == n { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}
