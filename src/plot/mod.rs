//! Plotting.
//!
//! - terminal plots for quick sanity checks (`ascii`)
//! - PNG/SVG figures rendered with Plotters (`figure`, `heatmap`, `fit_chart`)

pub mod ascii;
pub mod figure;
pub mod fit_chart;
pub mod heatmap;

pub use ascii::*;
pub use figure::*;
pub use fit_chart::*;
pub use heatmap::*;
