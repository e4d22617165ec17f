//! # End Caps and End Treatments
//!
//! Two jobs at the rod ends:
//!
//! - **Fans** close the open bottom and top of the helix grid against the
//!   apex points on the axis, so the sweep is a closed solid on its own.
//! - **Treatments** are the solids that later trim the sweep to its length:
//!   slabs (or 45° bevel wedges on external rods) cut away everything past
//!   each end, and short cones fill in a bevel on internal masks.

use super::grid::GridLayout;
use super::higbee::EndModifiers;
use crate::error::{ThreadError, ThreadResult};
use crate::mesh::Mesh;
use crate::primitives::{create_cube, create_cylinder, revolve};
use config::constants::{BEVEL_FILL_OVERLAP, END_CUTTER_PITCHES};
use glam::{DVec2, DVec3};
use tracing::debug;

// =============================================================================
// CAP FANS
// =============================================================================

/// Faces joining the grid to the two apex points.
///
/// For every column pair the first row is fanned to the bottom apex and the
/// last row to the top apex. Each start also leaves one open period at the
/// bottom of its column 0 and at the top of its column `K`; those are fanned
/// to the same apexes.
pub(crate) fn cap_faces(layout: &GridLayout) -> Vec<[u32; 3]> {
    let bottom = GridLayout::BOTTOM_APEX;
    let top = GridLayout::TOP_APEX;
    let (n, l) = (layout.column_len, layout.period_len);

    let mut faces = Vec::with_capacity(2 * layout.starts * (layout.columns + l));
    for i in 0..layout.starts {
        for k in 0..layout.columns {
            faces.push([bottom, layout.index(i, k + 1, 0), layout.index(i, k, 0)]);
            faces.push([layout.index(i, k, n - 1), layout.index(i, k + 1, n - 1), top]);
        }
        for j in 0..l {
            faces.push([bottom, layout.index(i, 0, j), layout.index(i, 0, j + 1)]);
        }
        for j in n - l - 1..n - 1 {
            faces.push([top, layout.index(i, layout.columns, j + 1), layout.index(i, layout.columns, j)]);
        }
    }
    faces
}

// =============================================================================
// END TREATMENTS
// =============================================================================

/// Geometry needed to build the end treatments.
#[derive(Debug, Clone)]
pub(crate) struct CapParams {
    pub length: f64,
    pub pitch: f64,
    /// Working radius at the bottom end.
    pub r1: f64,
    /// Working radius at the top end.
    pub r2: f64,
    /// Crest height of the profile in pitch units.
    pub max_y: f64,
    pub depth: f64,
    pub internal: bool,
    pub ends: EndModifiers,
    pub segments: u32,
}

/// Solids subtracted from (`cutters`) and added to (`fills`) the sweep.
#[derive(Debug, Clone, Default)]
pub struct EndTreatments {
    pub cutters: Vec<Mesh>,
    pub fills: Vec<Mesh>,
}

/// Builds the trimming and bevel solids for both ends.
pub(crate) fn end_treatments(params: &CapParams) -> ThreadResult<EndTreatments> {
    let half = params.length / 2.0;
    let pmax = params.pitch * params.max_y;
    let maxlen = END_CUTTER_PITCHES * params.pitch;
    let slope = (params.r1 - params.r2) / params.length;
    let reach = params.r1.max(params.r2) + pmax + 1.0 + slope.abs() * maxlen;

    let mut treatments = EndTreatments::default();
    // (sign, radius at this end, outward slope, bevel)
    let ends = [
        (-1.0, params.r1, -slope, params.ends.end1.bevel),
        (1.0, params.r2, slope, params.ends.end2.bevel),
    ];
    for (sign, radius, slope, bevel) in ends {
        let crest = radius + pmax;
        let cutter = if bevel && !params.internal {
            let inner = crest - params.depth;
            if inner <= 0.0 {
                return Err(ThreadError::impossible(format!(
                    "bevel of depth {} reaches the axis at crest radius {crest}",
                    params.depth
                )));
            }
            let profile: Vec<DVec2> = [
                (0.0, half),
                (inner, half),
                (crest + slope * params.depth, half - params.depth),
                (reach, half - params.depth),
                (reach, half + maxlen),
                (0.0, half + maxlen),
            ]
            .into_iter()
            .map(|(r, z)| DVec2::new(r, sign * z))
            .collect();
            revolve(&profile, params.segments)?
        } else {
            let mut slab = create_cube(DVec3::new(2.0 * reach, 2.0 * reach, maxlen), true)?;
            slab.translate(DVec3::new(0.0, 0.0, sign * (half + maxlen / 2.0)));
            slab
        };
        treatments.cutters.push(cutter);

        if bevel && params.internal {
            let inner = crest + slope * params.depth - params.depth;
            if inner <= 0.0 {
                return Err(ThreadError::impossible(format!(
                    "bevel fill of depth {} closes the bore at radius {crest}",
                    params.depth
                )));
            }
            let height = params.depth + BEVEL_FILL_OVERLAP;
            let (r_bottom, r_top, z0) = if sign < 0.0 {
                (crest, inner, -half - BEVEL_FILL_OVERLAP)
            } else {
                (inner, crest, half - params.depth)
            };
            let mut cone = create_cylinder(height, r_bottom, r_top, false, params.segments)?;
            cone.translate(DVec3::new(0.0, 0.0, z0));
            treatments.fills.push(cone);
        }
    }

    debug!(
        cutters = treatments.cutters.len(),
        fills = treatments.fills.len(),
        "end treatments built"
    );
    Ok(treatments)
}
