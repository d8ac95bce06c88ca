//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - turns arguments into config structs
//! - runs the requested pipeline
//! - prints terminal reports

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, CriticalArgs, FitArgs, HeatmapArgs, ScanArgs, CRIT_FILE};
use crate::domain::{ClassifierParams, FitConfig, IntegrationOptions, ScanConfig};
use crate::error::AppError;
use crate::math::linspace;
use crate::scan::CriticalOptions;

pub mod pipeline;

const ASCII_WIDTH: usize = 80;
const ASCII_HEIGHT: usize = 20;

/// Entry point for the `psec` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scan(args) => handle_scan(args),
        Command::Heatmap(args) => handle_heatmap(args),
        Command::Critical(args) => handle_critical(args),
        Command::Fit(args) => handle_fit(args),
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the level chosen by `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_scan(args: ScanArgs) -> Result<(), AppError> {
    let config = scan_config_from_args(&args);

    println!("{}", crate::report::format_scan_banner(&config));
    let run = pipeline::run_scan(&config, &args.out_dir, !args.no_plot)?;

    println!("{}", crate::report::format_scan_table(&run.rows));
    for mesh in run.meshes.iter().flatten() {
        println!("{}", crate::plot::render_ascii_mesh(mesh));
    }

    println!("Table:    {}", run.table_path.display());
    println!("Manifest: {}", run.manifest_path.display());
    if let Some(path) = &run.heatmap_path {
        println!("Heatmap:  {}", path.display());
    }
    Ok(())
}

fn handle_heatmap(args: HeatmapArgs) -> Result<(), AppError> {
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| args.csv.with_extension("png"));
    let meshes = pipeline::run_heatmap(&args.csv, &out)?;
    for mesh in &meshes {
        println!("{}", crate::plot::render_ascii_mesh(mesh));
    }
    println!("Heatmap: {}", out.display());
    Ok(())
}

fn handle_critical(args: CriticalArgs) -> Result<(), AppError> {
    let out = args.out.clone().unwrap_or_else(|| sibling(&args.csv, CRIT_FILE));
    let opts = CriticalOptions {
        sector: args.sector,
        level: args.level,
    };
    let dataset = pipeline::run_critical(&args.csv, opts, &out)?;

    println!("{:>8} {:>12}", "k_rot", "m_phi_crit");
    for entry in &dataset.data {
        let fmt = |v: Option<f64>| v.map_or_else(|| "null".to_string(), |x| format!("{x:.4}"));
        println!("{:>8} {:>12}", fmt(entry.k_rot), fmt(entry.m_phi_crit));
    }
    println!("Critical curve: {}", out.display());
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!("{}", crate::report::format_fit_summary(&run.output.summary));
    if config.plot {
        println!(
            "{}",
            crate::plot::render_ascii_fit(&run.output, ASCII_WIDTH, ASCII_HEIGHT)
        );
    }

    println!("Summary: {}", run.summary_path.display());
    if let Some(path) = &run.plot_path {
        println!("Figure:  {}", path.display());
    }
    Ok(())
}

pub fn scan_config_from_args(args: &ScanArgs) -> ScanConfig {
    ScanConfig {
        m_grid: linspace(args.m_min, args.m_max, args.m_steps),
        k_grid: linspace(args.k_min, args.k_max, args.k_steps),
        n_delta: args.n_delta,
        integration: IntegrationOptions {
            a_ini: args.a_ini,
            a_max: args.a_max,
            n_steps: args.n_steps,
            ..IntegrationOptions::default()
        },
        classifier: ClassifierParams {
            tail_fraction: args.tail_fraction,
            tol_a: args.tol_a,
            tol_b: args.tol_b,
        },
        parallel: !args.serial,
        ..ScanConfig::default()
    }
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        input: args.input.clone(),
        out_dir: args.out_dir.clone(),
        plot: !args.no_plot,
    }
}

fn sibling(path: &Path, file_name: &str) -> PathBuf {
    path.parent()
        .map(|dir| dir.join(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}
