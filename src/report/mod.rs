//! Terminal reports for scan and fit runs.

pub mod format;

pub use format::*;
