//! Command-line parsing for the `psec` phase-sector tools.
//!
//! Argument parsing and command dispatch stay separate from the numerical
//! code: this module only declares the clap surface; `app` turns parsed
//! arguments into config structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Sector;

pub const DEFAULT_OUT_DIR: &str = "results_phase_sectors";
pub const SCAN_TABLE_FILE: &str = "phase_sector_probabilities.csv";
pub const HEATMAP_FILE: &str = "phase_sector_probabilities.png";
pub const MANIFEST_FILE: &str = "phase_sector_manifest.json";
pub const CRIT_FILE: &str = "mphi_crit_vs_krot.json";
pub const FIT_SUMMARY_FILE: &str = "mphi_crit_vs_krot_fit_summary.json";
pub const FIT_PLOT_FILE: &str = "mphi_crit_vs_krot_fit.png";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "psec", version, about = "Phase-sector scans and critical-mass fits")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan the (m_phi, k_rot) grid and tabulate sector probabilities.
    Scan(ScanArgs),
    /// Re-render the probability heatmap from an existing scan table.
    Heatmap(HeatmapArgs),
    /// Extract the critical-mass curve from a scan table.
    Critical(CriticalArgs),
    /// Fit a parabola to the critical-mass curve.
    Fit(FitArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ScanArgs {
    /// Output directory for the table, heatmap and manifest.
    #[arg(long, default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    #[arg(long, default_value_t = 0.3)]
    pub m_min: f64,

    #[arg(long, default_value_t = 3.0)]
    pub m_max: f64,

    /// Number of mass values.
    #[arg(long, default_value_t = 7)]
    pub m_steps: usize,

    #[arg(long, default_value_t = 0.0)]
    pub k_min: f64,

    #[arg(long, default_value_t = 0.5)]
    pub k_max: f64,

    /// Number of coupling values.
    #[arg(long, default_value_t = 7)]
    pub k_steps: usize,

    /// Initial phase offsets sampled per grid point, spread over [0, π].
    #[arg(long, default_value_t = 40)]
    pub n_delta: usize,

    /// Initial scale factor.
    #[arg(long, default_value_t = 1e-3)]
    pub a_ini: f64,

    /// Final scale factor.
    #[arg(long, default_value_t = 10.0)]
    pub a_max: f64,

    /// Output samples per trajectory.
    #[arg(long, default_value_t = 1500)]
    pub n_steps: usize,

    /// Fraction of each trajectory treated as the asymptotic tail.
    #[arg(long, default_value_t = 0.2)]
    pub tail_fraction: f64,

    /// Sector A threshold.
    #[arg(long, default_value_t = 0.1)]
    pub tol_a: f64,

    /// Sector B threshold.
    #[arg(long, default_value_t = 0.1)]
    pub tol_b: f64,

    /// Evaluate grid points on a single thread.
    #[arg(long)]
    pub serial: bool,

    /// Skip the heatmap figure and terminal meshes.
    #[arg(long)]
    pub no_plot: bool,
}

#[derive(Debug, Args, Clone)]
pub struct HeatmapArgs {
    /// Scan table produced by `psec scan`.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Figure path (`.png` or `.svg`). Defaults to the table path with a `.png` extension.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CriticalArgs {
    /// Scan table produced by `psec scan`.
    #[arg(long, value_name = "CSV")]
    pub csv: PathBuf,

    /// Sector whose probability defines the threshold.
    #[arg(long, value_enum, default_value_t = Sector::A)]
    pub sector: Sector,

    /// Probability level whose crossing marks the critical mass.
    #[arg(long, default_value_t = 0.5)]
    pub level: f64,

    /// Output JSON. Defaults to `mphi_crit_vs_krot.json` next to the table.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Critical-curve JSON produced by `psec critical`.
    #[arg(long, default_value_os_t = default_crit_path())]
    pub input: PathBuf,

    /// Output directory for the summary and figure.
    #[arg(long, default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// Skip the fit figure and terminal plot.
    #[arg(long)]
    pub no_plot: bool,
}

fn default_crit_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_DIR).join(CRIT_FILE)
}
