//! Scan driver.
//!
//! For each `(m_phi, k_rot)` grid point:
//! - sample `n_delta` initial phases evenly over `[delta_min, delta_max]`
//! - integrate each trajectory with the configured options
//! - classify the trajectory and count sectors
//!
//! Grid points are independent, so they can be evaluated on the rayon pool.
//! Output order is always mass-major / coupling-minor, independent of
//! scheduling.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{ScanConfig, ScanRow, SectorCounts};
use crate::error::AppError;
use crate::ode::{PhaseIntegrator, PhaseRequest};
use crate::sector::SectorClassifier;

/// Run the full grid scan.
pub fn scan_grid<I>(config: &ScanConfig, integrator: &I) -> Result<Vec<ScanRow>, AppError>
where
    I: PhaseIntegrator + ?Sized,
{
    config.validate()?;
    let classifier = SectorClassifier::new(config.classifier)?;
    let deltas = config.delta_inis();

    let points: Vec<(f64, f64)> = config
        .m_grid
        .iter()
        .flat_map(|&m| config.k_grid.iter().map(move |&k| (m, k)))
        .collect();
    let total = points.len();
    let done = AtomicUsize::new(0);

    let evaluate = |&(m_phi, k_rot): &(f64, f64)| -> Result<ScanRow, AppError> {
        let row = scan_point(m_phi, k_rot, &deltas, config, &classifier, integrator)?;
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            "point {n}/{total}: m_phi={m_phi:.3}, k_rot={k_rot:.3} -> P_A={:.2}, P_B={:.2}, P_C={:.2}",
            row.p_a, row.p_b, row.p_c
        );
        Ok(row)
    };

    if config.parallel {
        points.par_iter().map(evaluate).collect()
    } else {
        points.iter().map(evaluate).collect()
    }
}

/// Integrate and classify every initial phase for one grid point.
pub fn scan_point<I>(
    m_phi: f64,
    k_rot: f64,
    deltas: &[f64],
    config: &ScanConfig,
    classifier: &SectorClassifier,
    integrator: &I,
) -> Result<ScanRow, AppError>
where
    I: PhaseIntegrator + ?Sized,
{
    let mut counts = SectorCounts::default();

    for &d0 in deltas {
        let request = PhaseRequest::new(m_phi, k_rot, d0, &config.integration);
        let trajectory = integrator.integrate(&request)?;
        trajectory.validate().map_err(|e| {
            AppError::data_integrity(format!(
                "m_phi={m_phi}, k_rot={k_rot}, delta_phi_ini={d0}: {e}"
            ))
        })?;

        let sector = classifier.classify(&trajectory.delta_phi)?;
        debug!(m_phi, k_rot, delta_phi_ini = d0, sector = sector.label(), "classified");
        counts.record(sector);
    }

    Ok(ScanRow::from_counts(m_phi, k_rot, counts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    use proptest::prelude::*;

    use crate::domain::Sector;
    use crate::ode::PhaseTrajectory;

    /// Analytic stub: relaxes to 0 for small offsets, to π for mid offsets,
    /// and keeps rotating for large ones.
    fn stub(req: &PhaseRequest) -> Result<PhaseTrajectory, AppError> {
        let n = req.n_steps;
        let a: Vec<f64> = (0..n).map(|i| req.a_ini + i as f64).collect();
        let delta_phi: Vec<f64> = (0..n)
            .map(|i| {
                let decay = (-(i as f64) / 10.0).exp();
                if req.delta_phi_ini < 1.0 {
                    req.delta_phi_ini * decay
                } else if req.delta_phi_ini < 2.5 {
                    PI + (req.delta_phi_ini - PI) * decay
                } else {
                    req.delta_phi_ini + 0.3 * i as f64
                }
            })
            .collect();
        Ok(PhaseTrajectory {
            a,
            delta_phidot: vec![0.0; n],
            delta_phi,
        })
    }

    fn small_config() -> ScanConfig {
        let mut cfg = ScanConfig {
            m_grid: vec![0.5, 1.0],
            k_grid: vec![0.0, 0.25, 0.5],
            n_delta: 8,
            parallel: false,
            ..ScanConfig::default()
        };
        cfg.integration.n_steps = 100;
        cfg
    }

    #[test]
    fn rows_follow_grid_order() {
        let rows = scan_grid(&small_config(), &stub).unwrap();
        let coords: Vec<(f64, f64)> = rows.iter().map(|r| (r.m_phi, r.k_rot)).collect();
        assert_eq!(
            coords,
            vec![(0.5, 0.0), (0.5, 0.25), (0.5, 0.5), (1.0, 0.0), (1.0, 0.25), (1.0, 0.5)]
        );
    }

    #[test]
    fn counts_match_stub_sectors() {
        // 8 offsets over [0, π]: 0, .449, .898 -> A; 1.346, 1.795, 2.244 -> B; 2.693, 3.142 -> C.
        let rows = scan_grid(&small_config(), &stub).unwrap();
        for row in &rows {
            assert_eq!((row.n_a, row.n_b, row.n_c), (3, 3, 2));
            assert_eq!(row.n_total, 8);
            assert!((row.probability(Sector::A) - 3.0 / 8.0).abs() < 1e-12);
        }
    }

    #[test]
    fn parallel_and_serial_agree() {
        let serial = scan_grid(&small_config(), &stub).unwrap();
        let parallel = scan_grid(
            &ScanConfig {
                parallel: true,
                ..small_config()
            },
            &stub,
        )
        .unwrap();
        assert_eq!(serial, parallel);
    }

    #[test]
    fn misaligned_integrator_output_is_rejected() {
        let bad = |req: &PhaseRequest| -> Result<PhaseTrajectory, AppError> {
            Ok(PhaseTrajectory {
                a: vec![0.0; req.n_steps - 1],
                delta_phi: vec![0.0; req.n_steps],
                delta_phidot: vec![0.0; req.n_steps],
            })
        };
        let err = scan_grid(&small_config(), &bad).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DataIntegrity);
        assert!(err.message().contains("m_phi=0.5"));
    }

    #[test]
    fn integrator_failure_aborts_the_scan() {
        let failing = |_req: &PhaseRequest| -> Result<PhaseTrajectory, AppError> {
            Err(AppError::integrator("boom"))
        };
        let err = scan_grid(&small_config(), &failing).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Integrator);
    }

    #[test]
    fn invalid_config_is_rejected_before_integrating() {
        let cfg = ScanConfig {
            k_grid: Vec::new(),
            ..small_config()
        };
        assert!(scan_grid(&cfg, &stub).is_err());
    }

    #[test]
    fn repeated_masses_fail_before_any_integration() {
        let calls = AtomicUsize::new(0);
        let counting = |req: &PhaseRequest| {
            calls.fetch_add(1, Ordering::Relaxed);
            stub(req)
        };
        let cfg = ScanConfig {
            m_grid: vec![1.0, 1.0, 1.0],
            ..small_config()
        };
        let err = scan_grid(&cfg, &counting).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    proptest! {
        #[test]
        fn probabilities_sum_to_one(n_delta in 1usize..24, m in 0.1f64..3.0, k in 0.0f64..0.5) {
            let mut cfg = small_config();
            cfg.n_delta = n_delta;
            let classifier = SectorClassifier::default();
            let row = scan_point(m, k, &cfg.delta_inis(), &cfg, &classifier, &stub).unwrap();
            prop_assert_eq!(row.n_total, n_delta);
            prop_assert!((row.p_a + row.p_b + row.p_c - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn no_samples_gives_zero_probabilities() {
        let cfg = small_config();
        let classifier = SectorClassifier::default();
        let row = scan_point(1.0, 0.1, &[], &cfg, &classifier, &stub).unwrap();
        assert_eq!(row.n_total, 0);
        assert_eq!((row.p_a, row.p_b, row.p_c), (0.0, 0.0, 0.0));
    }
}
