//! Mathematical utilities: least squares, polynomials, descriptive stats.

pub mod ols;
pub mod poly;
pub mod stats;

pub use ols::*;
pub use poly::*;
pub use stats::*;
