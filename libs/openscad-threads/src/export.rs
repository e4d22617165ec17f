//! # Mesh Export
//!
//! Flat GPU buffers plus ASCII STL and Wavefront OBJ writers.

use crate::error::ThreadResult;
use crate::mesh::Mesh;
use serde::Serialize;
use std::io::Write;

/// Mesh buffers suitable for GPU rendering.
///
/// # Examples
/// ```
/// use openscad_threads::primitives::create_cube;
/// use glam::DVec3;
///
/// let c = create_cube(DVec3::ONE, false).unwrap();
/// let buffers = c.to_mesh_buffers();
///
/// assert_eq!(buffers.vertices.len(), 8 * 3);
/// assert_eq!(buffers.indices.len(), 12 * 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeshBuffers {
    /// Vertex positions as flat array [x, y, z, x, y, z, ...].
    pub vertices: Vec<f32>,
    /// Triangle indices as flat array [i0, i1, i2, ...].
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

impl Mesh {
    /// Converts to `f32` buffers.
    pub fn to_mesh_buffers(&self) -> MeshBuffers {
        MeshBuffers {
            vertices: self.vertices_f32(),
            indices: self.indices_u32(),
        }
    }
}

/// Writes an ASCII STL solid named `name`.
pub fn write_stl<W: Write>(mesh: &Mesh, name: &str, mut out: W) -> ThreadResult<()> {
    writeln!(out, "solid {name}")?;
    for &tri in mesh.triangles() {
        let [a, b, c] = mesh.triangle_points(tri);
        let normal = (b - a).cross(c - a).normalize_or_zero();
        writeln!(out, "  facet normal {:e} {:e} {:e}", normal.x, normal.y, normal.z)?;
        writeln!(out, "    outer loop")?;
        for p in [a, b, c] {
            writeln!(out, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        writeln!(out, "    endloop")?;
        writeln!(out, "  endfacet")?;
    }
    writeln!(out, "endsolid {name}")?;
    Ok(())
}

/// Writes a Wavefront OBJ with one-based face indices.
pub fn write_obj<W: Write>(mesh: &Mesh, mut out: W) -> ThreadResult<()> {
    for v in mesh.vertices() {
        writeln!(out, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for [a, b, c] in mesh.triangles() {
        writeln!(out, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::create_cube;
    use glam::DVec3;

    #[test]
    fn test_buffers_match_mesh() {
        let cube = create_cube(DVec3::splat(2.0), true).unwrap();
        let buffers = cube.to_mesh_buffers();
        assert_eq!(buffers.vertex_count(), cube.vertex_count());
        assert_eq!(buffers.triangle_count(), cube.triangle_count());
        assert!(buffers.vertices.iter().all(|v| v.abs() == 1.0));
    }

    #[test]
    fn test_stl_structure() {
        let cube = create_cube(DVec3::ONE, false).unwrap();
        let mut out = Vec::new();
        write_stl(&cube, "cube", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("solid cube\n"));
        assert!(text.trim_end().ends_with("endsolid cube"));
        assert_eq!(text.matches("facet normal").count(), 12);
        assert_eq!(text.matches("vertex").count(), 36);
    }

    #[test]
    fn test_obj_indices_are_one_based() {
        let cube = create_cube(DVec3::ONE, false).unwrap();
        let mut out = Vec::new();
        write_obj(&cube, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 8);
        let faces: Vec<&str> = text.lines().filter(|l| l.starts_with("f ")).collect();
        assert_eq!(faces.len(), 12);
        assert!(faces
            .iter()
            .flat_map(|l| l.split_whitespace().skip(1))
            .all(|i| (1..=8).contains(&i.parse::<u32>().unwrap())));
    }
}
