//! `phase-sectors` library crate.
//!
//! The binary (`psec`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - integrators and classifiers can be reused from other drivers
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod ode;
pub mod plot;
pub mod report;
pub mod scan;
pub mod sector;
