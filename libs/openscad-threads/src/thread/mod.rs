//! # Threading
//!
//! Helical thread generation, leaves first:
//!
//! - [`profile`]: profile validation and the internal-thread mirror
//! - [`higbee`]: end options and blunt-start angles
//! - [`grid`]: angular column sampling of the swept surface
//! - [`caps`]: cap fans and end trimming solids
//! - [`assemble`]: stitching the grid into a closed mesh
//! - [`rod`], [`nut`], [`helix`]: public entry points
//! - [`profiles`]: parametric thread forms

pub mod assemble;
pub mod caps;
pub mod grid;
pub mod helix;
pub mod higbee;
pub mod nut;
pub mod profile;
pub mod profiles;
pub mod rod;

pub use caps::EndTreatments;
pub use helix::{thread_helix, HelixSpec};
pub use higbee::{higbee_offsets, EndModifier, EndModifiers, EndOverrides, Higbee, HigbeeOffsets};
pub use nut::{generic_threaded_nut, NutShape, NutSpec};
pub use profile::{NormalizedProfile, Profile};
pub use rod::{generic_threaded_rod, ThreadSpec, ThreadedRod};
