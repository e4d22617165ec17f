//! # Config Crate
//!
//! Centralized configuration constants for the helical thread generator.
//! Tolerances, tessellation defaults, clearance and nut proportions are
//! defined here so every builder reads them from one place.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{GlobalConfig, EPSILON};
//!
//! let value: f64 = 0.00000000001;
//! assert!(value.abs() < EPSILON);
//!
//! let cfg = GlobalConfig::default().with_fn(32);
//! assert_eq!(cfg.segments(5.0), 32);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **OpenSCAD Compatible**: Resolution defaults match OpenSCAD behavior
//! - **Validated**: Runtime settings go through [`constants::GlobalConfig::new`]

pub mod constants;

#[cfg(test)]
mod tests;
