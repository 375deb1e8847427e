//! Stippling of 2D scalar fields with split/merge Voronoi relaxation
//!
//! A density field (from an image, a point dataset or a synthetic gradient)
//! is approximated by stipples whose local density matches the field. The
//! relaxation repeatedly tessellates the stipples, measures the mass of each
//! cell, and deletes, splits or recentres stipples until every cell holds
//! roughly one stipple's worth of mass.

#![forbid(unsafe_code)]

/// Split/merge relaxation, mass assignment and stipple bookkeeping
pub mod algorithm;
/// Density fields, contrast enhancement and field sources
pub mod field;
/// Polygon measures and the tessellation contract with its Voronoi provider
pub mod geometry;
/// Input/output operations and error handling
pub mod io;

pub use algorithm::relaxation::{RelaxationConfig, RelaxationLoop, Stippling};
pub use field::density::DensityField;
pub use io::error::{AlgorithmError, Result};
