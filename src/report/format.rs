//! Formatted terminal output.
//!
//! Formatting lives here so the scan and fit code stay free of presentation
//! details and output changes stay localized.

use crate::domain::{FitSummary, ScanConfig, ScanRow, VertexKind};

/// Header printed before a scan starts.
pub fn format_scan_banner(config: &ScanConfig) -> String {
    let mut out = String::new();

    out.push_str("=== psec - phase-sector scan ===\n");
    out.push_str(&format!(
        "Grid: {} x {} = {} points | m_phi=[{:.3}, {:.3}] | k_rot=[{:.3}, {:.3}]\n",
        config.m_grid.len(),
        config.k_grid.len(),
        config.grid_len(),
        bound(&config.m_grid, f64::min),
        bound(&config.m_grid, f64::max),
        bound(&config.k_grid, f64::min),
        bound(&config.k_grid, f64::max),
    ));
    out.push_str(&format!(
        "Samples: {} initial phases per point in [{:.4}, {:.4}]\n",
        config.n_delta, config.delta_min, config.delta_max
    ));
    let io = &config.integration;
    out.push_str(&format!(
        "Integration: a=[{:e}, {}] | n_steps={} | q={} | h0={} | rtol={:e} atol={:e}\n",
        io.a_ini, io.a_max, io.n_steps, io.q, io.h0, io.rtol, io.atol
    ));
    let cp = &config.classifier;
    out.push_str(&format!(
        "Classifier: tail_fraction={} | tol_A={} | tol_B={}\n",
        cp.tail_fraction, cp.tol_a, cp.tol_b
    ));

    out
}

/// One line per grid point, in scan order.
pub fn format_scan_table(rows: &[ScanRow]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>8} {:>8} {:>7} {:>7} {:>7} {:>7}\n",
            "m_phi", "k_rot", "N", "P_A", "P_B", "P_C"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<8} {:-<8} {:-<7} {:-<7} {:-<7} {:-<7}", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows {
        out.push_str(&format!(
            "{:>8.3} {:>8.3} {:>7} {:>7.3} {:>7.3} {:>7.3}\n",
            r.m_phi, r.k_rot, r.n_total, r.p_a, r.p_b, r.p_c
        ));
    }

    out
}

/// Coefficient, vertex and goodness-of-fit block for `psec fit`.
pub fn format_fit_summary(summary: &FitSummary) -> String {
    let mut out = String::new();
    let coeffs = &summary.parabola_coeffs;
    let kind = match summary.vertex_kind {
        VertexKind::Maximum => "maximum",
        VertexKind::Minimum => "minimum",
    };

    out.push_str("=== psec - critical-mass fit ===\n");
    out.push_str(&format!("Source: {}\n", summary.source_file));
    out.push_str(&format!("Points: n={}\n", summary.stats.num_points));
    out.push_str(&format!("Form: {}\n", coeffs.form));
    out.push_str(&format!(
        "- a = {:.6}\n- b = {:.6}\n- c = {:.6}\n",
        coeffs.a, coeffs.b, coeffs.c
    ));
    out.push_str(&format!(
        "Vertex ({kind}): k_peak = {:.6}, m_phi_peak = {:.6}\n",
        summary.k_peak, summary.m_phi_peak
    ));
    out.push_str(&format!("R^2 = {:.6}\n", summary.r2));
    out.push_str(&format!(
        "m_phi_crit: mean = {:.6}, std = {:.6}\n",
        summary.stats.mean_m_phi_crit, summary.stats.std_m_phi_crit
    ));

    out
}

fn bound(values: &[f64], pick: fn(f64, f64) -> f64) -> f64 {
    values.iter().copied().reduce(pick).unwrap_or(f64::NAN)
}
