//! Critical-curve fitting.
//!
//! Responsibilities:
//!
//! - least-squares parabola `m(k) = a k² + b k + c` with vertex and R² (`quadratic`)
//! - descriptive stats + persisted summary record (`summary`)

pub mod quadratic;
pub mod summary;

pub use quadratic::*;
pub use summary::*;
