//! # Boolean Operations (CSG)
//!
//! Constructive Solid Geometry operations using BSP trees.
//!
//! ## Algorithm
//!
//! Based on the csg.js algorithm by Evan Wallace:
//! - Union: A.clipTo(B); B.clipTo(A); B.invert(); B.clipTo(A); B.invert(); combine
//! - Difference: A.invert(); A.clipTo(B); B.clipTo(A); B.invert(); B.clipTo(A); B.invert(); combine; invert
//! - Intersection: A.invert(); B.clipTo(A); B.invert(); A.clipTo(B); B.clipTo(A); combine; invert
//!
//! Results are welded at
//! [`VERTEX_MERGE_EPSILON`](config::constants::VERTEX_MERGE_EPSILON), then
//! the T-junctions left where one polygon was split and its neighbour was
//! not are stitched with [`Mesh::repair_t_junctions`].
//!
//! ## Example
//!
//! ```rust
//! use openscad_threads::ops::boolean::difference;
//! use openscad_threads::primitives::create_cube;
//! use glam::DVec3;
//!
//! let a = create_cube(DVec3::splat(2.0), true).unwrap();
//! let b = create_cube(DVec3::splat(1.0), false).unwrap();
//! let result = difference(&a, &b).unwrap();
//! assert!(result.signed_volume() < a.signed_volume());
//! ```

mod bsp;
mod plane;
mod polygon;


use crate::error::{ThreadError, ThreadResult};
use crate::mesh::Mesh;
use bsp::BspTree;
use config::constants::{BSP_EPSILON, VERTEX_MERGE_EPSILON};
use polygon::Polygon;
use tracing::debug;

// =============================================================================
// PUBLIC API
// =============================================================================

/// Computes the union of two meshes.
pub fn union(a: &Mesh, b: &Mesh) -> ThreadResult<Mesh> {
    check_input("union", a)?;
    check_input("union", b)?;
    if a.is_empty() {
        return Ok(b.clone());
    }
    if b.is_empty() || !boxes_overlap(a, b) {
        let mut result = a.clone();
        result.merge(b);
        return Ok(result);
    }

    let mut bsp_a = BspTree::new(mesh_to_polygons(a));
    let mut bsp_b = BspTree::new(mesh_to_polygons(b));

    bsp_a.clip_to(&bsp_b);
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();

    let mut polygons = bsp_a.into_polygons();
    polygons.extend(bsp_b.into_polygons());
    finish("union", polygons, false)
}

/// Computes the difference of two meshes (A - B).
pub fn difference(a: &Mesh, b: &Mesh) -> ThreadResult<Mesh> {
    check_input("difference", a)?;
    check_input("difference", b)?;
    if a.is_empty() {
        return Ok(Mesh::new());
    }
    if b.is_empty() || !boxes_overlap(a, b) {
        return Ok(a.clone());
    }

    let mut bsp_a = BspTree::new(mesh_to_polygons(a));
    let mut bsp_b = BspTree::new(mesh_to_polygons(b));

    // A - B = ~(~A | B)
    bsp_a.invert();
    bsp_a.clip_to(&bsp_b);
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();

    let mut polygons = bsp_a.into_polygons();
    polygons.extend(bsp_b.into_polygons());
    finish("difference", polygons, true)
}

/// Computes the intersection of two meshes.
pub fn intersection(a: &Mesh, b: &Mesh) -> ThreadResult<Mesh> {
    check_input("intersection", a)?;
    check_input("intersection", b)?;
    if a.is_empty() || b.is_empty() || !boxes_overlap(a, b) {
        return Ok(Mesh::new());
    }

    let mut bsp_a = BspTree::new(mesh_to_polygons(a));
    let mut bsp_b = BspTree::new(mesh_to_polygons(b));

    // A & B = ~(~A | ~B)
    bsp_a.invert();
    bsp_b.clip_to(&bsp_a);
    bsp_b.invert();
    bsp_a.clip_to(&bsp_b);
    bsp_b.clip_to(&bsp_a);

    let mut polygons = bsp_a.into_polygons();
    polygons.extend(bsp_b.into_polygons());
    finish("intersection", polygons, true)
}

/// Unions a list of meshes left to right.
pub fn union_all<'a>(meshes: impl IntoIterator<Item = &'a Mesh>) -> ThreadResult<Mesh> {
    meshes
        .into_iter()
        .try_fold(Mesh::new(), |acc, mesh| union(&acc, mesh))
}

// =============================================================================
// CONVERSION HELPERS
// =============================================================================

fn check_input(operation: &'static str, mesh: &Mesh) -> ThreadResult<()> {
    if mesh.validate() {
        Ok(())
    } else {
        Err(ThreadError::boolean_failed(
            operation,
            "input mesh has out-of-range or repeated triangle indices",
        ))
    }
}

fn boxes_overlap(a: &Mesh, b: &Mesh) -> bool {
    let (amin, amax) = a.bounding_box();
    let (bmin, bmax) = b.bounding_box();
    amin.cmple(bmax + BSP_EPSILON).all() && bmin.cmple(amax + BSP_EPSILON).all()
}

/// Converts each triangle to a polygon, skipping zero-area slivers.
fn mesh_to_polygons(mesh: &Mesh) -> Vec<Polygon> {
    mesh.triangles()
        .iter()
        .filter_map(|tri| Polygon::new(mesh.triangle_points(*tri).to_vec()))
        .collect()
}

/// Fan-triangulates convex polygons into a welded, stitched mesh.
fn finish(operation: &'static str, mut polygons: Vec<Polygon>, invert: bool) -> ThreadResult<Mesh> {
    if invert {
        for poly in &mut polygons {
            poly.flip();
        }
    }

    let mut mesh = Mesh::new();
    for poly in &polygons {
        let base = mesh.vertex_count() as u32;
        for v in poly.vertices() {
            mesh.add_vertex(*v);
        }
        for i in 1..poly.vertices().len() as u32 - 1 {
            mesh.add_triangle(base, base + i, base + i + 1);
        }
    }
    mesh.weld_default();
    let stitched = mesh.repair_t_junctions(VERTEX_MERGE_EPSILON);

    debug!(
        operation,
        polygons = polygons.len(),
        stitched,
        triangles = mesh.triangle_count(),
        "boolean finished"
    );
    Ok(mesh)
}
