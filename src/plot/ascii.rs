//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Fit plot elements:
//! - observed points: `o`
//! - fitted parabola: `-` (sampled four times per column)
//! - vertex column: `|`
//!
//! Mesh plot: one character per grid cell, shaded by probability
//! (` ` = 0 ... `@` = 1), `?` for cells that were never scanned.

use crate::fit::FitOutput;
use crate::scan::{MeshCell, ProbabilityMesh};

const SHADES: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
const MISSING: char = '?';

/// Render the fitted parabola over the observed critical masses.
pub fn render_ascii_fit(output: &FitOutput, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (k_min, k_max) = range(output.k_rot.iter().copied()).unwrap_or((0.0, 1.0));
    let curve = output.fit.sample_curve(k_min, k_max, width * 4);
    let (m_min, m_max) = range(
        output
            .m_phi_crit
            .iter()
            .copied()
            .chain(curve.iter().map(|&(_, m)| m)),
    )
    .unwrap_or((0.0, 1.0));

    let x_axis = Axis::padded(k_min, k_max, 0.02, width);
    let y_axis = Axis::padded(m_min, m_max, 0.05, height);
    let row_of = |m: f64| height - 1 - y_axis.cell(m);

    let mut grid = vec![vec![' '; width]; height];

    let k_peak = output.fit.k_peak;
    if (x_axis.lo..=x_axis.hi).contains(&k_peak) {
        let x = x_axis.cell(k_peak);
        for row in grid.iter_mut() {
            row[x] = '|';
        }
    }

    for &(k, m) in &curve {
        grid[row_of(m)][x_axis.cell(k)] = '-';
    }
    for (&k, &m) in output.k_rot.iter().zip(&output.m_phi_crit) {
        grid[row_of(m)][x_axis.cell(k)] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: k_rot=[{:.3}, {:.3}] | m_phi_crit=[{:.3}, {:.3}]\n",
        x_axis.lo, x_axis.hi, y_axis.lo, y_axis.hi
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

/// Render a probability mesh: masses top (high) to bottom (low), couplings left to right.
pub fn render_ascii_mesh(mesh: &ProbabilityMesh) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "P_{} ({}) | rows: m_phi high->low | cols: k_rot low->high\n",
        mesh.sector.label(),
        mesh.sector.display_name()
    ));

    for i in (0..mesh.masses.len()).rev() {
        let cells: String = (0..mesh.couplings.len())
            .map(|j| shade(mesh.get(i, j)))
            .collect();
        out.push_str(&format!("{:>8.3} |{cells}|\n", mesh.masses[i]));
    }

    if let (Some(first), Some(last)) = (mesh.couplings.first(), mesh.couplings.last()) {
        out.push_str(&format!("{:>8} k_rot=[{first:.3}, {last:.3}]\n", ""));
    }
    out
}

fn shade(cell: MeshCell) -> char {
    cell.value().map_or(MISSING, |p| {
        SHADES[(p.clamp(0.0, 1.0) * (SHADES.len() - 1) as f64).round() as usize]
    })
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

/// Value range mapped onto `cells` character positions.
#[derive(Debug, Clone, Copy)]
struct Axis {
    lo: f64,
    hi: f64,
    cells: usize,
}

impl Axis {
    fn padded(lo: f64, hi: f64, frac: f64, cells: usize) -> Self {
        let span = hi - lo;
        let pad = if span > 0.0 { span * frac } else { 0.5 };
        Self {
            lo: lo - pad,
            hi: hi + pad,
            cells,
        }
    }

    fn cell(&self, v: f64) -> usize {
        let u = ((v - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0);
        (u * (self.cells - 1) as f64).round() as usize
    }
}
