//! # Cylinder Primitive
//!
//! Cylinders, cones and frusta along the Z axis.

use super::revolve::revolve;
use crate::error::{require_positive, ThreadError, ThreadResult};
use crate::mesh::Mesh;
use glam::DVec2;

/// Creates a cylinder or cone mesh.
///
/// # Arguments
///
/// * `height` - Height along Z axis
/// * `radius_bottom` - Radius at z=0 (or z=-h/2 if centered)
/// * `radius_top` - Radius at z=h (or z=h/2 if centered)
/// * `center` - If true, center vertically at origin
/// * `segments` - Number of segments around circumference
///
/// # Example
///
/// ```rust
/// use openscad_threads::primitives::create_cylinder;
///
/// let mesh = create_cylinder(10.0, 5.0, 5.0, false, 32).unwrap();
/// assert!(mesh.is_closed_manifold());
///
/// let cone = create_cylinder(10.0, 5.0, 0.0, false, 32).unwrap();
/// assert!(cone.is_closed_manifold());
/// ```
pub fn create_cylinder(
    height: f64,
    radius_bottom: f64,
    radius_top: f64,
    center: bool,
    segments: u32,
) -> ThreadResult<Mesh> {
    require_positive("cylinder height", height)?;

    if !(radius_bottom >= 0.0 && radius_top >= 0.0) {
        return Err(ThreadError::invalid(format!(
            "Cylinder radii must be non-negative: r1={radius_bottom}, r2={radius_top}"
        )));
    }
    if radius_bottom == 0.0 && radius_top == 0.0 {
        return Err(ThreadError::invalid(
            "Cylinder must have at least one non-zero radius",
        ));
    }

    let (z_bottom, z_top) = if center {
        (-height / 2.0, height / 2.0)
    } else {
        (0.0, height)
    };

    revolve(
        &[
            DVec2::new(0.0, z_bottom),
            DVec2::new(radius_bottom, z_bottom),
            DVec2::new(radius_top, z_top),
            DVec2::new(0.0, z_top),
        ],
        segments,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_cylinder_counts() {
        let mesh = create_cylinder(10.0, 5.0, 5.0, false, 16).unwrap();
        // Two rings plus two axis points
        assert_eq!(mesh.vertex_count(), 34);
        assert_eq!(mesh.triangle_count(), 64);
    }

    #[test]
    fn test_cylinder_volume_approaches_circle() {
        let segments = 256;
        let mesh = create_cylinder(2.0, 1.0, 1.0, true, segments).unwrap();
        let polygon_area = 0.5 * segments as f64 * (2.0 * PI / segments as f64).sin();
        assert_relative_eq!(mesh.signed_volume(), polygon_area * 2.0, epsilon = 1e-9);
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min.z, -1.0);
        assert_relative_eq!(max.z, 1.0);
    }

    #[test]
    fn test_inverted_cone_is_closed() {
        let mesh = create_cylinder(3.0, 0.0, 2.0, false, 12).unwrap();
        assert!(mesh.is_closed_manifold());
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn test_cylinder_rejects_bad_input() {
        assert!(create_cylinder(0.0, 1.0, 1.0, false, 16).is_err());
        assert!(create_cylinder(1.0, 0.0, 0.0, false, 16).is_err());
        assert!(create_cylinder(1.0, -1.0, 1.0, false, 16).is_err());
        assert!(create_cylinder(1.0, 1.0, 1.0, false, 2).is_err());
    }
}
