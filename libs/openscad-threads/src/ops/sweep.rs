//! # Helical Sweep
//!
//! Sweeps a closed 2D profile along a helix, optionally scaling the profile
//! depth down at either end.
//!
//! ## Profile Frame
//!
//! Profile `x` runs along the helix axis and profile `y` points away from
//! the base surface: outward for external ridges, inward when
//! [`HelixSweepParams::internal`] is set.

use super::triangulate::triangulate_polygon;
use crate::error::{require_positive, ThreadError, ThreadResult};
use crate::mesh::Mesh;
use crate::primitives::revolve::signed_area;
use config::constants::HELIX_TAPER_FLOOR;
use glam::{DVec2, DVec3};
use std::f64::consts::TAU;
use tracing::debug;

/// Parameters for [`helix_sweep`].
#[derive(Debug, Clone, PartialEq)]
pub struct HelixSweepParams {
    /// Base radius at the start of the helix.
    pub r1: f64,
    /// Base radius at the end of the helix.
    pub r2: f64,
    /// Axial rise over the full sweep.
    pub height: f64,
    /// Number of revolutions.
    pub turns: f64,
    /// Samples per revolution.
    pub segments: u32,
    /// Degrees of rotation over which the profile grows in at the start.
    pub taper1: f64,
    /// Degrees of rotation over which the profile shrinks out at the end.
    pub taper2: f64,
    /// Sweep the profile inward instead of outward.
    pub internal: bool,
}

/// Sweeps `profile` along a helix around the Z axis, starting at angle 0
/// and height 0.
///
/// The result is closed with triangulated end caps and oriented outward.
///
/// # Example
///
/// ```rust
/// use openscad_threads::ops::{helix_sweep, HelixSweepParams};
/// use glam::DVec2;
///
/// let ridge = [DVec2::new(-0.4, 0.0), DVec2::new(0.4, 0.0), DVec2::new(0.0, 0.5)];
/// let params = HelixSweepParams {
///     r1: 5.0,
///     r2: 5.0,
///     height: 4.0,
///     turns: 2.0,
///     segments: 24,
///     taper1: 0.0,
///     taper2: 0.0,
///     internal: false,
/// };
/// let mesh = helix_sweep(&ridge, &params).unwrap();
/// assert!(mesh.is_closed_manifold());
/// ```
pub fn helix_sweep(profile: &[DVec2], params: &HelixSweepParams) -> ThreadResult<Mesh> {
    require_positive("helix turns", params.turns)?;
    require_positive("helix start radius", params.r1)?;
    require_positive("helix end radius", params.r2)?;
    if !(params.height.is_finite() && params.height >= 0.0) {
        return Err(ThreadError::invalid(format!(
            "helix height must be non-negative, got {}",
            params.height
        )));
    }
    if params.segments < 3 {
        return Err(ThreadError::invalid(format!(
            "helix needs at least 3 segments per turn, got {}",
            params.segments
        )));
    }
    if !(params.taper1 >= 0.0 && params.taper2 >= 0.0) {
        return Err(ThreadError::invalid("helix taper angles must be non-negative"));
    }

    let sign = if params.internal { -1.0 } else { 1.0 };
    // Local (radial, axial) frame; counter-clockwise there means outward faces
    let mut local: Vec<DVec2> = profile.iter().map(|p| DVec2::new(sign * p.y, p.x)).collect();
    if signed_area(&local) < 0.0 {
        local.reverse();
    }
    let caps = triangulate_polygon(&local)?;

    let total = TAU * params.turns;
    let total_deg = 360.0 * params.turns;
    let steps = (params.segments as f64 * params.turns).ceil().max(1.0) as u32;
    let m = local.len() as u32;

    let mut mesh = Mesh::with_capacity(((steps + 1) * m) as usize, (2 * steps * m) as usize);
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let theta = total * t;
        let deg = total_deg * t;
        let scale = taper_scale(deg, params.taper1)
            .min(taper_scale(total_deg - deg, params.taper2));
        let radius = params.r1 + (params.r2 - params.r1) * t;
        let z = params.height * t;
        let (sin, cos) = theta.sin_cos();
        for p in &local {
            let r = radius + p.x * scale;
            mesh.add_vertex(DVec3::new(r * cos, r * sin, z + p.y));
        }
    }

    for i in 0..steps {
        let (a, b) = (i * m, (i + 1) * m);
        for j in 0..m {
            let k = (j + 1) % m;
            mesh.add_triangle(a + j, b + j, b + k);
            mesh.add_triangle(a + j, b + k, a + k);
        }
    }

    let last = steps * m;
    for t in &caps {
        mesh.add_triangle(t[0], t[1], t[2]);
        mesh.add_triangle(last + t[0], last + t[2], last + t[1]);
    }

    debug!(
        steps,
        profile_points = m,
        triangles = mesh.triangle_count(),
        "helix sweep built"
    );
    Ok(mesh)
}

/// Depth scale at `degrees` from an end with a taper of `taper` degrees.
fn taper_scale(degrees: f64, taper: f64) -> f64 {
    if taper <= 0.0 {
        1.0
    } else {
        (degrees / taper).clamp(HELIX_TAPER_FLOOR, 1.0)
    }
}
