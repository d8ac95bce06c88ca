//! Batch pipelines behind each `psec` subcommand.
//!
//! Each function runs one job end to end (compute, then write files) and
//! returns what it produced so `app` can decide what to print. The scan entry
//! point is generic over the integrator so tests can drive it with stubs.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::cli::{FIT_PLOT_FILE, FIT_SUMMARY_FILE, HEATMAP_FILE, MANIFEST_FILE, SCAN_TABLE_FILE};
use crate::domain::{CritDataset, FitConfig, ScanConfig, ScanManifest, ScanRow, Sector};
use crate::error::AppError;
use crate::fit::{FitOutput, summarize};
use crate::ode::{HubbleDampedPhase, PhaseIntegrator};
use crate::plot::{FitFigure, HeatmapFigure, save_figure};
use crate::scan::{CriticalOptions, ProbabilityMesh, critical_curve, scan_grid};

/// Outputs of one `psec scan` run.
#[derive(Debug, Clone)]
pub struct ScanRun {
    pub rows: Vec<ScanRow>,
    pub table_path: PathBuf,
    pub manifest_path: PathBuf,
    pub heatmap_path: Option<PathBuf>,
    /// `P_A` and `P_C` meshes behind the heatmap, when one was drawn.
    pub meshes: Option<[ProbabilityMesh; 2]>,
}

/// Outputs of one `psec fit` run.
#[derive(Debug, Clone)]
pub struct FitRun {
    pub output: FitOutput,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
}

/// Scan with the built-in phase integrator.
pub fn run_scan(config: &ScanConfig, out_dir: &Path, plot: bool) -> Result<ScanRun, AppError> {
    run_scan_with(config, &HubbleDampedPhase, out_dir, plot)
}

/// Scan the grid, then write the table, manifest and (optionally) the heatmap.
pub fn run_scan_with<I>(
    config: &ScanConfig,
    integrator: &I,
    out_dir: &Path,
    plot: bool,
) -> Result<ScanRun, AppError>
where
    I: PhaseIntegrator + ?Sized,
{
    let rows = scan_grid(config, integrator)?;

    let table_path = out_dir.join(SCAN_TABLE_FILE);
    crate::io::write_scan_csv(&table_path, &rows)?;
    info!("wrote {}", table_path.display());

    let manifest_path = out_dir.join(MANIFEST_FILE);
    let manifest = ScanManifest {
        tool: "psec".to_string(),
        generated_at: Utc::now(),
        grid_points: rows.len(),
        table_file: SCAN_TABLE_FILE.to_string(),
        config: config.clone(),
    };
    crate::io::write_manifest(&manifest_path, &manifest)?;

    let (heatmap_path, meshes) = if plot {
        let path = out_dir.join(HEATMAP_FILE);
        let meshes = render_heatmap(&rows, &path)?;
        (Some(path), Some(meshes))
    } else {
        (None, None)
    };

    Ok(ScanRun {
        rows,
        table_path,
        manifest_path,
        heatmap_path,
        meshes,
    })
}

/// Rebuild the heatmap from a scan table on disk.
pub fn run_heatmap(csv: &Path, out: &Path) -> Result<[ProbabilityMesh; 2], AppError> {
    let rows = crate::io::read_scan_csv(csv)?;
    render_heatmap(&rows, out)
}

/// Draw the `P_A` / `P_C` panels for `rows` and return the meshes behind them.
pub fn render_heatmap(rows: &[ScanRow], out: &Path) -> Result<[ProbabilityMesh; 2], AppError> {
    let left = ProbabilityMesh::from_rows(rows, Sector::A)?;
    let right = ProbabilityMesh::from_rows(rows, Sector::C)?;
    save_figure(
        out,
        &HeatmapFigure {
            left: &left,
            right: &right,
        },
    )?;
    info!("wrote {}", out.display());
    Ok([left, right])
}

/// Extract the critical-mass curve from a scan table and write it as JSON.
pub fn run_critical(csv: &Path, opts: CriticalOptions, out: &Path) -> Result<CritDataset, AppError> {
    let rows = crate::io::read_scan_csv(csv)?;
    let dataset = critical_curve(&rows, opts)?;
    crate::io::write_crit_dataset(out, &dataset)?;
    info!(
        "wrote {} ({} couplings, {} with a crossing)",
        out.display(),
        dataset.data.len(),
        dataset.data.iter().filter(|e| e.m_phi_crit.is_some()).count()
    );
    Ok(dataset)
}

/// Fit the critical-mass curve and write the summary (and figure).
pub fn run_fit(config: &FitConfig) -> Result<FitRun, AppError> {
    let dataset = crate::io::read_crit_dataset(&config.input)?;
    let source_file = config
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| config.input.display().to_string());

    let output = summarize(&dataset, &source_file)?;

    let summary_path = config.out_dir.join(FIT_SUMMARY_FILE);
    crate::io::write_fit_summary(&summary_path, &output.summary)?;
    info!("wrote {}", summary_path.display());

    let plot_path = if config.plot {
        let path = config.out_dir.join(FIT_PLOT_FILE);
        save_figure(&path, &FitFigure { output: &output })?;
        info!("wrote {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(FitRun {
        output,
        summary_path,
        plot_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CritEntry, ScanConfig};
    use crate::error::ErrorKind;
    use crate::ode::{PhaseRequest, PhaseTrajectory};

    /// Settles at 0 when `delta_phi_ini < m_phi`, otherwise keeps drifting.
    fn threshold_stub(req: &PhaseRequest) -> Result<PhaseTrajectory, AppError> {
        let n = 20;
        let delta_phi = if req.delta_phi_ini < req.m_phi {
            vec![0.0; n]
        } else {
            (0..n).map(|i| i as f64).collect()
        };
        Ok(PhaseTrajectory {
            a: (0..n).map(|i| 1.0 + i as f64).collect(),
            delta_phi,
            delta_phidot: vec![0.0; n],
        })
    }

    fn small_config() -> ScanConfig {
        ScanConfig {
            m_grid: vec![0.5, 1.5, 2.5],
            k_grid: vec![0.0, 0.25],
            n_delta: 4,
            parallel: false,
            ..ScanConfig::default()
        }
    }

    #[test]
    fn scan_writes_table_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_scan_with(&small_config(), &threshold_stub, dir.path(), false).unwrap();

        assert_eq!(run.rows.len(), 6);
        assert!(run.table_path.is_file());
        assert!(run.heatmap_path.is_none());
        assert!(run.meshes.is_none());

        let manifest: serde_json::Value =
            serde_json::from_reader(std::fs::File::open(&run.manifest_path).unwrap()).unwrap();
        assert_eq!(manifest["tool"], "psec");
        assert_eq!(manifest["grid_points"], 6);
        assert_eq!(manifest["table_file"], SCAN_TABLE_FILE);
    }

    #[test]
    fn scan_with_plot_writes_png_heatmap() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_scan_with(&small_config(), &threshold_stub, dir.path(), true).unwrap();

        let path = run.heatmap_path.unwrap();
        assert_eq!(path.file_name().unwrap(), HEATMAP_FILE);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
        let [a, c] = run.meshes.unwrap();
        assert_eq!((a.sector, c.sector), (Sector::A, Sector::C));
    }

    #[test]
    fn fit_with_plot_writes_png_figure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("crit.json");
        let ds = CritDataset {
            data: [(0.0, 1.0), (0.5, 1.6), (1.0, 2.0), (1.5, 1.7), (2.0, 1.0)]
                .iter()
                .map(|&(k, m)| CritEntry {
                    k_rot: Some(k),
                    m_phi_crit: Some(m),
                })
                .collect(),
        };
        crate::io::write_crit_dataset(&input, &ds).unwrap();

        let run = run_fit(&FitConfig {
            input,
            out_dir: dir.path().to_path_buf(),
            plot: true,
        })
        .unwrap();
        let path = run.plot_path.unwrap();
        assert_eq!(path.file_name().unwrap(), FIT_PLOT_FILE);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn heatmap_rerender_reads_table() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_scan_with(&small_config(), &threshold_stub, dir.path(), false).unwrap();
        let out = dir.path().join("heatmap.svg");
        let [a, c] = run_heatmap(&run.table_path, &out).unwrap();
        assert_eq!(a.sector, Sector::A);
        assert_eq!(c.sector, Sector::C);
        assert_eq!(a.missing_count(), 0);
        assert!(out.is_file());
    }

    #[test]
    fn fit_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = FitConfig {
            input: dir.path().join("absent.json"),
            out_dir: dir.path().to_path_buf(),
            plot: false,
        };
        let err = run_fit(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingInput);
        assert!(err.message().contains("psec critical"));
    }

    #[test]
    fn fit_records_source_basename() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("crit.json");
        let ds = CritDataset {
            data: [(0.0, 1.0), (1.0, 2.0), (2.0, 1.0)]
                .iter()
                .map(|&(k, m)| CritEntry {
                    k_rot: Some(k),
                    m_phi_crit: Some(m),
                })
                .collect(),
        };
        crate::io::write_crit_dataset(&input, &ds).unwrap();

        let run = run_fit(&FitConfig {
            input,
            out_dir: dir.path().join("out"),
            plot: false,
        })
        .unwrap();
        assert_eq!(run.output.summary.source_file, "crit.json");
        assert!(run.summary_path.is_file());
        assert!((run.output.summary.k_peak - 1.0).abs() < 1e-9);
    }
}
