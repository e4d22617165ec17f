//! # Thread Mesh Assembly
//!
//! Turns a [`HelixGrid`] into one closed, outward-facing mesh: quads between
//! neighbouring columns are split into triangles, the cap fans are added, and
//! left-handed threads are mirrored across the XZ plane.
//!
//! Seam vertices are shared by index through [`GridLayout::index`], so no
//! epsilon welding is needed.

use super::caps::cap_faces;
use super::grid::{GridLayout, HelixGrid};
use crate::error::{ThreadError, ThreadResult};
use crate::mesh::Mesh;
use config::constants::GlobalConfig;
use glam::{DMat4, DVec3};
use std::f64::consts::PI;
use tracing::debug;

/// Facets per revolution for a thread of the given nominal radius, rounded
/// up to a multiple of `starts`.
pub(crate) fn thread_sides(config: &GlobalConfig, radius: f64, starts: u32) -> u32 {
    config.segments(radius).div_ceil(starts) * starts
}

/// Radii actually swept.
///
/// Internal masks are inflated so that the faceted bore is no smaller than
/// the true circle, then widened by the clearance on each side.
pub(crate) fn working_radii(r1: f64, r2: f64, sides: u32, internal: bool, slop: f64) -> (f64, f64) {
    if internal {
        let inflate = 1.0 / (PI / f64::from(sides)).cos();
        (r1 * inflate + 2.0 * slop, r2 * inflate + 2.0 * slop)
    } else {
        (r1, r2)
    }
}

/// Fails unless the thread depth is strictly less than both radii.
pub(crate) fn check_depth(depth: f64, r1: f64, r2: f64) -> ThreadResult<()> {
    let governing = r1.min(r2);
    if depth >= governing {
        return Err(ThreadError::impossible(format!(
            "thread depth {depth} must be less than the radius {governing}"
        )));
    }
    Ok(())
}

/// Stitches the grid and its caps into a closed mesh.
pub(crate) fn assemble(grid: &HelixGrid, internal: bool, left_handed: bool) -> Mesh {
    let layout: &GridLayout = grid.layout();
    let vertices = grid.vertices();
    let (n, columns) = (layout.column_len, layout.columns);

    let mut triangles = Vec::with_capacity(2 * layout.starts * columns * n);
    for i in 0..layout.starts {
        for k in 0..columns {
            for j in 0..n - 1 {
                let a = layout.index(i, k, j);
                let b = layout.index(i, k + 1, j);
                let c = layout.index(i, k + 1, j + 1);
                let d = layout.index(i, k, j + 1);
                triangles.extend(split_quad(&vertices, [a, b, c, d], internal));
            }
        }
    }
    triangles.extend(cap_faces(layout));

    let mut mesh = Mesh::from_parts(vertices, triangles);
    if left_handed {
        mesh.transform(&DMat4::from_scale(DVec3::new(1.0, -1.0, 1.0)));
    }

    debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        left_handed,
        "thread sweep assembled"
    );
    mesh
}

/// Splits quad `abcd` along the diagonal that keeps it convex (external) or
/// concave (internal) as seen from outside.
fn split_quad(vertices: &[DVec3], [a, b, c, d]: [u32; 4], concave: bool) -> [[u32; 3]; 2] {
    let p = |i: u32| vertices[i as usize];
    let (pa, pb, pc, pd) = (p(a), p(b), p(c), p(d));
    let normal = (pb - pa).cross(pc - pa);
    let d_below = normal.dot(pd - pa) <= 0.0;
    if d_below != concave {
        [[a, b, c], [a, c, d]]
    } else {
        [[a, b, d], [b, c, d]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::grid::GridParams;
    use crate::thread::higbee::HigbeeOffsets;
    use crate::thread::profile::Profile;
    use approx::assert_relative_eq;

    fn sweep(starts: u32, sides: u32, internal: bool, left_handed: bool) -> Mesh {
        let profile = Profile::from_pairs(&[[-0.3, -0.5], [-0.1, 0.0], [0.1, 0.0], [0.3, -0.5]])
            .unwrap()
            .normalized(internal);
        let grid = HelixGrid::build(&GridParams {
            profile: &profile,
            pitch: 1.0,
            length: 6.0,
            r1: 4.0,
            r2: 4.0,
            starts,
            sides,
            internal,
            higbee: HigbeeOffsets {
                end1: Some(200.0),
                end2: None,
            },
            extend1: false,
            extend2: false,
        })
        .unwrap();
        assemble(&grid, internal, left_handed)
    }

    #[test]
    fn test_sweep_is_closed_and_outward() {
        for (starts, sides) in [(1, 12), (2, 12), (3, 15)] {
            let mesh = sweep(starts, sides, false, false);
            assert!(mesh.validate());
            assert!(mesh.is_closed_manifold(), "starts={starts} not closed");
            assert!(mesh.signed_volume() > 0.0);
        }
    }

    #[test]
    fn test_internal_and_left_handed_stay_outward() {
        for (internal, left) in [(true, false), (false, true), (true, true)] {
            let mesh = sweep(2, 12, internal, left);
            assert!(mesh.is_closed_manifold());
            assert!(mesh.signed_volume() > 0.0);
        }
    }

    #[test]
    fn test_left_handed_mirrors_vertices() {
        let right = sweep(1, 12, false, false);
        let left = sweep(1, 12, false, true);
        for (r, l) in right.vertices().iter().zip(left.vertices()) {
            assert_relative_eq!(r.x, l.x);
            assert_relative_eq!(r.y, -l.y);
            assert_relative_eq!(r.z, l.z);
        }
        assert_relative_eq!(right.signed_volume(), left.signed_volume(), epsilon = 1e-9);
    }

    #[test]
    fn test_working_radii() {
        assert_eq!(working_radii(5.0, 4.0, 12, false, 0.2), (5.0, 4.0));
        let (r1, r2) = working_radii(5.0, 5.0, 4, true, 0.0);
        assert_relative_eq!(r1, 5.0 * 2f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(r2, r1);
        let (r1, _) = working_radii(5.0, 5.0, 4, true, 0.1);
        assert_relative_eq!(r1, 5.0 * 2f64.sqrt() + 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_sides_round_up_to_starts() {
        let config = GlobalConfig::default().with_fn(16);
        assert_eq!(thread_sides(&config, 5.0, 1), 16);
        assert_eq!(thread_sides(&config, 5.0, 3), 18);
        assert_eq!(thread_sides(&config, 5.0, 4), 16);
    }

    #[test]
    fn test_depth_check() {
        assert!(check_depth(1.0, 5.0, 4.0).is_ok());
        assert!(check_depth(4.0, 5.0, 4.0).is_err());
    }
}
