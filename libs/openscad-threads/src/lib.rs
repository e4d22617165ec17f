//! # OpenSCAD Threads
//!
//! Parametric helical thread meshes: threaded rods, internal thread masks,
//! nuts and bare thread ridges, from arbitrary thread profiles.
//!
//! ## Architecture
//!
//! ```text
//! Profile → Higbee offsets → helix grid → cap fans → closed sweep
//!                                                       │
//!                        end trimming (boolean layer) ◄─┘ → rod / nut
//! ```
//!
//! ## Algorithms
//!
//! All algorithms are pure Rust:
//! - **Thread sweep**: angular column grid, stitched by index
//! - **Boolean Operations**: BSP trees (csg.js algorithm)
//! - **Triangulation**: Ear clipping with robust orientation predicates
//! - **Primitives**: Solids of revolution, boxes, chamfered prisms
//!
//! ## Usage
//!
//! ```rust
//! use openscad_threads::{generic_threaded_rod, profiles, ThreadSpec};
//! use config::constants::GlobalConfig;
//!
//! let spec = ThreadSpec::new(profiles::iso_metric(1.25).unwrap(), 1.25, 8.0, 10.0);
//! let rod = generic_threaded_rod(&spec, &GlobalConfig::default()).unwrap();
//! assert!(rod.sweep().is_closed_manifold());
//! ```

pub mod error;
pub mod export;
pub mod mesh;
pub mod ops;
pub mod primitives;
pub mod scene;
pub mod thread;

pub use error::{ThreadError, ThreadResult};
pub use export::{write_obj, write_stl, MeshBuffers};
pub use mesh::Mesh;
pub use scene::{Anchor, Placement, Scene};
pub use thread::{
    generic_threaded_nut, generic_threaded_rod, higbee_offsets, profiles, thread_helix,
    EndModifier, EndModifiers, EndOverrides, Higbee, HelixSpec, NutShape, NutSpec, Profile,
    ThreadSpec, ThreadedRod,
};
