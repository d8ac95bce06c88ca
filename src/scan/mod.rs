//! Sector-probability scan over the (mass, coupling) grid.
//!
//! Responsibilities:
//!
//! - drive the integrator + classifier over every grid point (`driver`)
//! - reshape flat result rows into a 2D probability mesh (`mesh`)
//! - extract the critical-mass curve from the mesh (`critical`)

pub mod critical;
pub mod driver;
pub mod mesh;

pub use critical::*;
pub use driver::*;
pub use mesh::*;
