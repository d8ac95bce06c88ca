//! End-to-end: scan -> table -> critical curve -> parabola fit.
//!
//! The stub integrator synchronizes (sector A) whenever the initial offset is
//! below `m_phi / (1 + k_rot (1 - k_rot))`, and drifts away (sector C)
//! otherwise. The critical mass is therefore symmetric about `k_rot = 0.5`.

use phase_sectors::app::pipeline::{run_critical, run_fit, run_scan_with};
use phase_sectors::domain::{FitConfig, ScanConfig, Sector, VertexKind};
use phase_sectors::error::{AppError, ErrorKind};
use phase_sectors::math::linspace;
use phase_sectors::ode::{PhaseRequest, PhaseTrajectory};
use phase_sectors::scan::CriticalOptions;

const SAMPLES: usize = 30;

fn stub(req: &PhaseRequest) -> Result<PhaseTrajectory, AppError> {
    let threshold = req.m_phi / (1.0 + req.k_rot * (1.0 - req.k_rot));
    let delta_phi = if req.delta_phi_ini < threshold {
        vec![0.0; SAMPLES]
    } else {
        (0..SAMPLES).map(|i| req.delta_phi_ini + 0.5 * i as f64).collect()
    };
    Ok(PhaseTrajectory {
        a: linspace(req.a_ini, req.a_max, SAMPLES),
        delta_phi,
        delta_phidot: vec![0.0; SAMPLES],
    })
}

fn config() -> ScanConfig {
    ScanConfig {
        m_grid: linspace(0.5, 3.0, 11),
        k_grid: vec![0.0, 0.5, 1.0],
        ..ScanConfig::default()
    }
}

#[test]
fn scan_to_fit_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let scan = run_scan_with(&config(), &stub, dir.path(), false).unwrap();
    assert_eq!(scan.rows.len(), 33);
    for row in &scan.rows {
        assert_eq!(row.n_total, 40);
        assert_eq!(row.n_b, 0);
        assert!((row.p_a + row.p_b + row.p_c - 1.0).abs() < 1e-12);
    }

    let crit_path = dir.path().join("crit.json");
    let dataset = run_critical(&scan.table_path, CriticalOptions::default(), &crit_path).unwrap();
    assert_eq!(dataset.data.len(), 3);
    let crit: Vec<f64> = dataset.data.iter().map(|e| e.m_phi_crit.unwrap()).collect();
    assert!((crit[0] - crit[2]).abs() < 1e-12);
    assert!(crit[1] > crit[0]);

    let fit = run_fit(&FitConfig {
        input: crit_path,
        out_dir: dir.path().join("fit"),
        plot: false,
    })
    .unwrap();
    let summary = &fit.output.summary;
    assert_eq!(summary.stats.num_points, 3);
    assert_eq!(summary.vertex_kind, VertexKind::Maximum);
    assert!((summary.k_peak - 0.5).abs() < 1e-9);
    assert!((summary.m_phi_peak - crit[1]).abs() < 1e-9);
    assert!((summary.r2 - 1.0).abs() < 1e-9);
    assert!(fit.summary_path.is_file());
}

#[test]
fn parallel_and_serial_scans_agree() {
    let dir = tempfile::tempdir().unwrap();
    let parallel = run_scan_with(&config(), &stub, &dir.path().join("par"), false).unwrap();
    let serial_config = ScanConfig {
        parallel: false,
        ..config()
    };
    let serial = run_scan_with(&serial_config, &stub, &dir.path().join("ser"), false).unwrap();
    assert_eq!(parallel.rows, serial.rows);
}

#[test]
fn flat_critical_curve_is_degenerate() {
    // Offset threshold independent of k_rot: every coupling gets the same
    // critical mass, so the fitted parabola has no curvature.
    let flat = |req: &PhaseRequest| stub(&PhaseRequest { k_rot: 0.0, ..*req });
    let dir = tempfile::tempdir().unwrap();
    let scan = run_scan_with(&config(), &flat, dir.path(), false).unwrap();

    let crit_path = dir.path().join("crit.json");
    let opts = CriticalOptions {
        sector: Sector::A,
        level: 0.5,
    };
    run_critical(&scan.table_path, opts, &crit_path).unwrap();

    let err = run_fit(&FitConfig {
        input: crit_path,
        out_dir: dir.path().to_path_buf(),
        plot: false,
    })
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DegenerateFit);
    assert_eq!(err.exit_code(), 4);
}
