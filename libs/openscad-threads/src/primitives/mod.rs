//! # Primitives
//!
//! Closed solids used by end treatments and nut bodies: boxes, frusta,
//! solids of revolution and chamfered polygonal prisms.

pub mod cube;
pub mod cylinder;
pub mod prism;
pub mod revolve;

pub use cube::create_cube;
pub use cylinder::create_cylinder;
pub use prism::chamfered_prism;
pub use revolve::revolve;
