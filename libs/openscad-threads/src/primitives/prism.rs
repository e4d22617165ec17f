//! # Chamfered Prism
//!
//! Regular polygonal prisms with optional end chamfers, the body of hex
//! and square nuts.

use super::revolve::revolve;
use crate::error::{require_positive, ThreadError, ThreadResult};
use crate::mesh::Mesh;
use glam::{DMat4, DVec2};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Creates a regular prism centered on the origin with one flat facing +Y.
///
/// # Arguments
///
/// * `sides` - Polygon side count (at least 3)
/// * `apothem` - Distance from the axis to each flat (half the flat-to-flat width)
/// * `height` - Height along Z, centered at z = 0
/// * `chamfer1` - Inset of the bottom face edges (0 for a sharp edge)
/// * `chamfer2` - Inset of the top face edges
///
/// # Example
///
/// ```rust
/// use openscad_threads::primitives::chamfered_prism;
///
/// let hex = chamfered_prism(6, 5.0, 4.0, 0.1, 0.1).unwrap();
/// assert!(hex.is_closed_manifold());
/// ```
pub fn chamfered_prism(
    sides: u32,
    apothem: f64,
    height: f64,
    chamfer1: f64,
    chamfer2: f64,
) -> ThreadResult<Mesh> {
    if sides < 3 {
        return Err(ThreadError::invalid(format!(
            "prism needs at least 3 sides, got {sides}"
        )));
    }
    require_positive("prism apothem", apothem)?;
    require_positive("prism height", height)?;
    for chamfer in [chamfer1, chamfer2] {
        if !(0.0..apothem).contains(&chamfer) {
            return Err(ThreadError::invalid(format!(
                "prism chamfer {chamfer} must lie in [0, {apothem})"
            )));
        }
    }
    if chamfer1 + chamfer2 >= height {
        return Err(ThreadError::impossible(format!(
            "chamfers {chamfer1} + {chamfer2} leave no wall on a prism of height {height}"
        )));
    }

    // Circumradius of a polygon with the given apothem
    let scale = 1.0 / (PI / sides as f64).cos();
    let circum = |a: f64| a * scale;
    let (z0, z1) = (-height / 2.0, height / 2.0);

    let profile = [
        DVec2::new(0.0, z0),
        DVec2::new(circum(apothem - chamfer1), z0),
        DVec2::new(circum(apothem), z0 + chamfer1),
        DVec2::new(circum(apothem), z1 - chamfer2),
        DVec2::new(circum(apothem - chamfer2), z1),
        DVec2::new(0.0, z1),
    ];
    let mut mesh = revolve(&profile, sides)?;

    let step = TAU / sides as f64;
    let phase = (FRAC_PI_2 - step / 2.0).rem_euclid(step);
    if phase != 0.0 {
        mesh.transform(&DMat4::from_rotation_z(phase));
    }

    Ok(mesh)
}
