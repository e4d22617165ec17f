//! # Polygon Triangulation
//!
//! Ear clipping for simple polygons, used to cap the open ends of helical
//! sweeps. Orientation tests go through `robust::orient2d` so nearly
//! collinear thread flanks are classified exactly.

use crate::error::{ThreadError, ThreadResult};
use glam::DVec2;
use robust::{orient2d, Coord};

fn orient(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    orient2d(
        Coord { x: a.x, y: a.y },
        Coord { x: b.x, y: b.y },
        Coord { x: c.x, y: c.y },
    )
}

/// Triangulates a simple polygon.
///
/// Returned triangles index into `points` and share the polygon's winding,
/// so a counter-clockwise input yields counter-clockwise triangles. Runs of
/// collinear points may produce zero-area triangles; they are kept so every
/// boundary edge stays matched.
///
/// # Example
///
/// ```rust
/// use openscad_threads::ops::triangulate_polygon;
/// use glam::DVec2;
///
/// let square = [DVec2::ZERO, DVec2::X, DVec2::ONE, DVec2::Y];
/// let triangles = triangulate_polygon(&square).unwrap();
/// assert_eq!(triangles.len(), 2);
/// ```
pub fn triangulate_polygon(points: &[DVec2]) -> ThreadResult<Vec<[u32; 3]>> {
    if points.len() < 3 {
        return Err(ThreadError::invalid(format!(
            "polygon needs at least 3 points, got {}",
            points.len()
        )));
    }

    let area2: f64 = (0..points.len())
        .map(|i| points[i].perp_dot(points[(i + 1) % points.len()]))
        .sum();
    if area2 == 0.0 {
        return Err(ThreadError::impossible("polygon has zero area"));
    }
    // Work on a counter-clockwise ring and flip triangles back at the end
    let ccw = area2 > 0.0;
    let mut ring: Vec<usize> = if ccw {
        (0..points.len()).collect()
    } else {
        (0..points.len()).rev().collect()
    };

    let mut triangles = Vec::with_capacity(points.len() - 2);
    let mut misses = 0;
    let mut i = 0;
    while ring.len() > 3 {
        let n = ring.len();
        let (prev, ear, next) = (ring[(i + n - 1) % n], ring[i % n], ring[(i + 1) % n]);

        if is_ear(points, &ring, prev, ear, next) {
            triangles.push([prev as u32, ear as u32, next as u32]);
            ring.remove(i % n);
            misses = 0;
        } else {
            i += 1;
            misses += 1;
            if misses > n {
                // Only collinear remnants left: clip the flattest corner
                let corner = |k: usize| (ring[(k + n - 1) % n], ring[k], ring[(k + 1) % n]);
                let turn = |k: usize| {
                    let (a, b, c) = corner(k);
                    orient(points[a], points[b], points[c])
                };
                let flat = (0..n)
                    .min_by(|&a, &b| turn(a).abs().total_cmp(&turn(b).abs()))
                    .unwrap_or(0);
                if turn(flat) < 0.0 {
                    return Err(ThreadError::impossible("polygon is self-intersecting"));
                }
                let (a, b, c) = corner(flat);
                triangles.push([a as u32, b as u32, c as u32]);
                ring.remove(flat);
                misses = 0;
            }
        }
        if i >= ring.len() {
            i = 0;
        }
    }
    triangles.push([ring[0] as u32, ring[1] as u32, ring[2] as u32]);

    if !ccw {
        for t in &mut triangles {
            t.swap(1, 2);
        }
    }
    Ok(triangles)
}

fn is_ear(points: &[DVec2], ring: &[usize], prev: usize, ear: usize, next: usize) -> bool {
    let (a, b, c) = (points[prev], points[ear], points[next]);
    if orient(a, b, c) <= 0.0 {
        return false;
    }
    ring.iter()
        .filter(|&&k| k != prev && k != ear && k != next)
        .all(|&k| {
            let p = points[k];
            // Coincident points are allowed to touch the ear
            if p == a || p == b || p == c {
                return true;
            }
            !(orient(a, b, p) >= 0.0 && orient(b, c, p) >= 0.0 && orient(c, a, p) >= 0.0)
        })
}
