//! Sector classification of phase-difference trajectories.
//!
//! - phase unwrapping (`unwrap`)
//! - asymptotic-tail classification into sectors A / B / C (`classifier`)

pub mod classifier;
pub mod unwrap;

pub use classifier::*;
pub use unwrap::*;
