//! # Cube Primitive
//!
//! Axis-aligned boxes, used as length-trimming slabs at rod ends.

use crate::error::{require_positive, ThreadResult};
use crate::mesh::Mesh;
use glam::DVec3;

/// Creates a box mesh.
///
/// # Arguments
///
/// * `size` - Dimensions [x, y, z]
/// * `center` - If true, center at origin; if false, corner at origin
///
/// # Example
///
/// ```rust
/// use openscad_threads::primitives::create_cube;
/// use glam::DVec3;
///
/// let mesh = create_cube(DVec3::splat(10.0), false).unwrap();
/// assert_eq!(mesh.vertex_count(), 8);
/// assert_eq!(mesh.triangle_count(), 12);
/// ```
pub fn create_cube(size: DVec3, center: bool) -> ThreadResult<Mesh> {
    require_positive("box width", size.x)?;
    require_positive("box depth", size.y)?;
    require_positive("box height", size.z)?;

    let (min, max) = if center {
        (-size / 2.0, size / 2.0)
    } else {
        (DVec3::ZERO, size)
    };

    let mut mesh = Mesh::with_capacity(8, 12);
    for z in [min.z, max.z] {
        mesh.add_vertex(DVec3::new(min.x, min.y, z));
        mesh.add_vertex(DVec3::new(max.x, min.y, z));
        mesh.add_vertex(DVec3::new(max.x, max.y, z));
        mesh.add_vertex(DVec3::new(min.x, max.y, z));
    }

    // Two CCW triangles per face, seen from outside
    const FACES: [[u32; 4]; 6] = [
        [0, 3, 2, 1], // bottom
        [4, 5, 6, 7], // top
        [0, 1, 5, 4], // front
        [2, 3, 7, 6], // back
        [3, 0, 4, 7], // left
        [1, 2, 6, 5], // right
    ];
    for [a, b, c, d] in FACES {
        mesh.add_triangle(a, b, c);
        mesh.add_triangle(a, c, d);
    }

    Ok(mesh)
}
