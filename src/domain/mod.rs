//! Domain types used throughout the pipelines.
//!
//! This module defines:
//!
//! - sector labels and per-grid-point counts (`Sector`, `SectorCounts`, `ScanRow`)
//! - scan configuration (`ScanConfig`, `IntegrationOptions`, `ClassifierParams`)
//! - critical-curve datasets and fit outputs (`CritDataset`, `FitSummary`)

pub mod types;

pub use types::*;
