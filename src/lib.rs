//! Generation of synthetic 2D magnetic field maps for the BDSIM tracking simulator.
//!
//! A [GridBuilder](magnetic::grid::GridBuilder) samples a field function over two axes into a
//! [FieldGrid](magnetic::grid::FieldGrid), which [output::file] writes as a BDSIM field file.
pub mod axis;
pub mod configuration;
pub mod constant;
pub mod error;
pub mod fileinput;
pub mod magnetic;
pub mod output;
pub mod pipeline;
pub mod visual;

pub use error::{FieldMapError, Result};
