//! # Solids of Revolution
//!
//! Revolves a closed (r, z) polygon a full turn around the Z axis.
//!
//! ## Algorithm
//!
//! 1. Consecutive duplicate points are dropped and the polygon is made
//!    counter-clockwise in the (r, z) plane
//! 2. Each point becomes a ring of `segments` vertices, or a single shared
//!    vertex when it lies on the axis
//! 3. Each polygon edge generates a band of quads (or a fan where one end
//!    touches the axis)

use crate::error::{ThreadError, ThreadResult};
use crate::mesh::Mesh;
use config::constants::EPSILON;
use glam::{DVec2, DVec3};
use std::f64::consts::TAU;

/// Ring of vertex indices for one profile point.
enum Ring {
    Axis(u32),
    Circle(u32),
}

/// Revolves an (r, z) polygon around the Z axis.
///
/// `profile` is a closed polygon with `x = r >= 0` and `y = z`. Points with
/// zero radius are collapsed onto the axis so the result is closed.
///
/// # Example
///
/// ```rust
/// use openscad_threads::primitives::revolve;
/// use glam::DVec2;
///
/// // A washer
/// let washer = revolve(
///     &[
///         DVec2::new(2.0, 0.0),
///         DVec2::new(4.0, 0.0),
///         DVec2::new(4.0, 1.0),
///         DVec2::new(2.0, 1.0),
///     ],
///     24,
/// )
/// .unwrap();
/// assert!(washer.is_closed_manifold());
/// ```
pub fn revolve(profile: &[DVec2], segments: u32) -> ThreadResult<Mesh> {
    if segments < 3 {
        return Err(ThreadError::invalid(format!(
            "revolve needs at least 3 segments, got {segments}"
        )));
    }
    if let Some(p) = profile.iter().find(|p| !p.is_finite() || p.x < -EPSILON) {
        return Err(ThreadError::invalid(format!(
            "revolve profile point {p} is not finite or has negative radius"
        )));
    }

    let mut points: Vec<DVec2> = Vec::with_capacity(profile.len());
    for &p in profile {
        if points.last().map_or(true, |last| last.distance(p) > EPSILON) {
            points.push(DVec2::new(p.x.max(0.0), p.y));
        }
    }
    while points.len() > 1 && points[0].distance(points[points.len() - 1]) <= EPSILON {
        points.pop();
    }
    if points.len() < 3 {
        return Err(ThreadError::invalid(
            "revolve profile needs at least 3 distinct points",
        ));
    }
    if signed_area(&points) < 0.0 {
        points.reverse();
    }

    let n = segments as usize;
    let mut mesh = Mesh::with_capacity(points.len() * n, points.len() * n * 2);
    let rings: Vec<Ring> = points
        .iter()
        .map(|p| {
            if p.x <= EPSILON {
                Ring::Axis(mesh.add_vertex(DVec3::new(0.0, 0.0, p.y)))
            } else {
                let start = mesh.vertex_count() as u32;
                for j in 0..n {
                    let theta = TAU * j as f64 / n as f64;
                    mesh.add_vertex(DVec3::new(p.x * theta.cos(), p.x * theta.sin(), p.y));
                }
                Ring::Circle(start)
            }
        })
        .collect();

    for i in 0..rings.len() {
        let (lower, upper) = (&rings[i], &rings[(i + 1) % rings.len()]);
        for j in 0..n as u32 {
            let k = (j + 1) % segments;
            match (lower, upper) {
                (Ring::Circle(a), Ring::Circle(b)) => {
                    mesh.add_triangle(a + j, a + k, b + k);
                    mesh.add_triangle(a + j, b + k, b + j);
                }
                (Ring::Axis(a), Ring::Circle(b)) => mesh.add_triangle(*a, b + k, b + j),
                (Ring::Circle(a), Ring::Axis(b)) => mesh.add_triangle(a + j, a + k, *b),
                (Ring::Axis(_), Ring::Axis(_)) => break,
            }
        }
    }

    Ok(mesh)
}

/// Shoelace area, positive for counter-clockwise polygons.
pub(crate) fn signed_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum::<f64>()
        / 2.0
}
