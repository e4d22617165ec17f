//! # Mesh Operations
//!
//! Boolean composition, polygon triangulation and the helical sweep.

pub mod boolean;
pub mod sweep;
pub mod triangulate;

pub use boolean::{difference, intersection, union, union_all};
pub use sweep::{helix_sweep, HelixSweepParams};
pub use triangulate::triangulate_polygon;
