//! # Mesh Data Structure
//!
//! Indexed triangle mesh shared by every builder in the crate, together with
//! the topology checks used to prove thread solids are closed.

use std::collections::HashMap;

use crate::error::{ThreadError, ThreadResult};
use config::constants::VERTEX_MERGE_EPSILON;
use glam::{DMat4, DVec3};

/// A triangle mesh with vertices and indices.
///
/// Triangles are wound counter-clockwise when viewed from outside the solid.
///
/// # Example
///
/// ```rust
/// use openscad_threads::Mesh;
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
/// mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
/// mesh.add_triangle(0, 1, 2);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    vertices: Vec<DVec3>,
    /// Triangle indices (3 indices per triangle)
    triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Creates a mesh from raw parts without validation.
    pub fn from_parts(vertices: Vec<DVec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Returns true if the mesh has no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Adds a vertex and returns its index.
    pub fn add_vertex(&mut self, position: DVec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(position);
        index
    }

    /// Adds a triangle by vertex indices.
    pub fn add_triangle(&mut self, v0: u32, v1: u32, v2: u32) {
        self.triangles.push([v0, v1, v2]);
    }

    /// Returns a reference to the vertices.
    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Returns a reference to the triangles.
    #[inline]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Returns the three corners of a triangle.
    #[inline]
    pub fn triangle_points(&self, tri: [u32; 3]) -> [DVec3; 3] {
        [
            self.vertices[tri[0] as usize],
            self.vertices[tri[1] as usize],
            self.vertices[tri[2] as usize],
        ]
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns (min, max) corners of the bounding box.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let Some(first) = self.vertices.first() else {
            return (DVec3::ZERO, DVec3::ZERO);
        };

        self.vertices[1..]
            .iter()
            .fold((*first, *first), |(min, max), v| (min.min(*v), max.max(*v)))
    }

    /// Largest distance of any vertex from the Z axis.
    pub fn max_radius(&self) -> f64 {
        self.vertices
            .iter()
            .map(|v| v.x.hypot(v.y))
            .fold(0.0, f64::max)
    }

    /// Transforms all vertices by a 4x4 matrix.
    ///
    /// Winding is reversed automatically when the matrix mirrors space so
    /// faces keep pointing outward.
    pub fn transform(&mut self, matrix: &DMat4) {
        for v in &mut self.vertices {
            *v = matrix.transform_point3(*v);
        }
        if matrix.determinant() < 0.0 {
            self.reverse_winding();
        }
    }

    /// Translates the mesh by a vector.
    pub fn translate(&mut self, offset: DVec3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Flips every triangle.
    pub fn reverse_winding(&mut self) {
        for tri in &mut self.triangles {
            tri.swap(1, 2);
        }
    }

    /// Merges another mesh into this one.
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;

        self.vertices.extend_from_slice(&other.vertices);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|tri| [tri[0] + offset, tri[1] + offset, tri[2] + offset]),
        );
    }

    /// Signed enclosed volume (positive for outward-facing solids).
    pub fn signed_volume(&self) -> f64 {
        self.triangles
            .iter()
            .map(|tri| {
                let [a, b, c] = self.triangle_points(*tri);
                a.dot(b.cross(c))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Merges vertices closer than `epsilon` and drops triangles that
    /// collapse as a result.
    ///
    /// Unused vertices are removed and indices compacted.
    pub fn weld(&mut self, epsilon: f64) {
        let cell = epsilon.max(f64::MIN_POSITIVE);
        let key = |p: DVec3| {
            (
                (p.x / cell).round() as i64,
                (p.y / cell).round() as i64,
                (p.z / cell).round() as i64,
            )
        };

        let mut grid: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
        let mut welded: Vec<DVec3> = Vec::new();
        let mut remap = Vec::with_capacity(self.vertices.len());

        for &p in &self.vertices {
            let (kx, ky, kz) = key(p);
            let mut found = None;
            'search: for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        if let Some(bucket) = grid.get(&(kx + dx, ky + dy, kz + dz)) {
                            if let Some(&idx) = bucket
                                .iter()
                                .find(|&&idx| welded[idx as usize].distance(p) <= epsilon)
                            {
                                found = Some(idx);
                                break 'search;
                            }
                        }
                    }
                }
            }
            let idx = found.unwrap_or_else(|| {
                let idx = welded.len() as u32;
                welded.push(p);
                grid.entry((kx, ky, kz)).or_default().push(idx);
                idx
            });
            remap.push(idx);
        }

        let triangles: Vec<[u32; 3]> = self
            .triangles
            .iter()
            .map(|tri| {
                [
                    remap[tri[0] as usize],
                    remap[tri[1] as usize],
                    remap[tri[2] as usize],
                ]
            })
            .filter(|t| t[0] != t[1] && t[1] != t[2] && t[0] != t[2])
            .collect();

        self.vertices = welded;
        self.triangles = triangles;
        self.compact();
    }

    /// Convenience for [`Mesh::weld`] at the crate's merge tolerance.
    pub fn weld_default(&mut self) {
        self.weld(VERTEX_MERGE_EPSILON);
    }

    /// Stitches T-junctions left by polygon splitting.
    ///
    /// Triangles thinner than `epsilon` are dropped first. Every remaining
    /// triangle with another vertex lying on one of its edges is replaced by
    /// a fan around its centroid through all of its boundary points, so each
    /// edge ends up shared with the triangles across it. Returns the number
    /// of triangles split.
    pub fn repair_t_junctions(&mut self, epsilon: f64) -> usize {
        let vertices = &self.vertices;
        self.triangles.retain(|tri| {
            let [a, b, c] = [0, 1, 2].map(|k| vertices[tri[k] as usize]);
            let longest = a.distance(b).max(b.distance(c)).max(c.distance(a));
            longest > 0.0 && (b - a).cross(c - a).length() / longest > epsilon
        });

        let mut by_x: Vec<u32> = (0..self.vertices.len() as u32).collect();
        by_x.sort_unstable_by(|&i, &j| {
            self.vertices[i as usize]
                .x
                .total_cmp(&self.vertices[j as usize].x)
        });

        let mut triangles = Vec::with_capacity(self.triangles.len());
        let mut split = 0;
        for tri in std::mem::take(&mut self.triangles) {
            let mut ring = Vec::with_capacity(3);
            for e in 0..3 {
                let (u, w) = (tri[e], tri[(e + 1) % 3]);
                ring.push(u);
                ring.extend(self.points_on_edge(&by_x, u, w, epsilon));
            }
            if ring.len() == 3 {
                triangles.push(tri);
                continue;
            }
            let [a, b, c] = tri.map(|i| self.vertices[i as usize]);
            let center = self.add_vertex((a + b + c) / 3.0);
            for i in 0..ring.len() {
                triangles.push([ring[i], ring[(i + 1) % ring.len()], center]);
            }
            split += 1;
        }
        self.triangles = triangles;
        split
    }

    /// Vertices strictly inside segment `u -> w`, ordered from `u`.
    fn points_on_edge(&self, by_x: &[u32], u: u32, w: u32, epsilon: f64) -> Vec<u32> {
        let (p, q) = (self.vertices[u as usize], self.vertices[w as usize]);
        let dir = q - p;
        let len_sq = dir.length_squared();
        if len_sq <= epsilon * epsilon {
            return Vec::new();
        }
        let (lo, hi) = (p.x.min(q.x) - epsilon, p.x.max(q.x) + epsilon);
        let start = by_x.partition_point(|&i| self.vertices[i as usize].x < lo);

        let mut hits: Vec<(f64, u32)> = by_x[start..]
            .iter()
            .take_while(|&&i| self.vertices[i as usize].x <= hi)
            .filter(|&&i| i != u && i != w)
            .filter_map(|&i| {
                let v = self.vertices[i as usize];
                let t = (v - p).dot(dir) / len_sq;
                let inside = v.distance(p) > epsilon && v.distance(q) > epsilon;
                (inside && (0.0..=1.0).contains(&t) && v.distance(p + dir * t) <= epsilon)
                    .then_some((t, i))
            })
            .collect();
        hits.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, i)| i).collect()
    }

    /// Removes vertices no triangle references.
    fn compact(&mut self) {
        let mut used = vec![u32::MAX; self.vertices.len()];
        let mut vertices = Vec::with_capacity(self.vertices.len());
        for tri in &mut self.triangles {
            for idx in tri.iter_mut() {
                let slot = &mut used[*idx as usize];
                if *slot == u32::MAX {
                    *slot = vertices.len() as u32;
                    vertices.push(self.vertices[*idx as usize]);
                }
                *idx = *slot;
            }
        }
        self.vertices = vertices;
    }

    /// Directed edges whose reverse partner is missing or that are used
    /// more than once.
    ///
    /// Empty for a closed, consistently oriented 2-manifold.
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        let counts = self.directed_edge_counts();
        let mut result: Vec<(u32, u32)> = counts
            .iter()
            .filter(|(&(a, b), &count)| count != 1 || counts.get(&(b, a)) != Some(&1))
            .map(|(&edge, _)| edge)
            .collect();
        result.sort_unstable();
        result
    }

    /// True when every directed edge is used exactly once and its reverse
    /// exactly once.
    pub fn is_closed_manifold(&self) -> bool {
        !self.is_empty() && self.validate() && self.boundary_edges().is_empty()
    }

    /// Fails with [`ThreadError::NonManifold`] unless the mesh is closed.
    pub fn ensure_closed(&self) -> ThreadResult<()> {
        let open = self.boundary_edges().len();
        if open > 0 || self.is_empty() || !self.validate() {
            return Err(ThreadError::NonManifold {
                boundary_edges: open,
            });
        }
        Ok(())
    }

    fn directed_edge_counts(&self) -> HashMap<(u32, u32), u32> {
        let mut counts = HashMap::with_capacity(self.triangles.len() * 3);
        for tri in &self.triangles {
            for i in 0..3 {
                *counts.entry((tri[i], tri[(i + 1) % 3])).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Validates index sanity.
    ///
    /// Checks:
    /// - All triangle indices are valid
    /// - No triangle repeats an index
    pub fn validate(&self) -> bool {
        let vertex_count = self.vertices.len() as u32;

        self.triangles.iter().all(|tri| {
            tri.iter().all(|&i| i < vertex_count)
                && tri[0] != tri[1]
                && tri[1] != tri[2]
                && tri[0] != tri[2]
        })
    }

    /// Exports vertices as f32 array for GPU.
    ///
    /// Returns flattened [x, y, z, x, y, z, ...] array.
    pub fn vertices_f32(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| [v.x as f32, v.y as f32, v.z as f32])
            .collect()
    }

    /// Exports triangle indices as u32 array for GPU.
    ///
    /// Returns flattened [i0, i1, i2, i0, i1, i2, ...] array.
    pub fn indices_u32(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::create_cube;
    use approx::assert_relative_eq;

    fn tetrahedron() -> Mesh {
        Mesh::from_parts(
            vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z],
            vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]],
        )
    }

    #[test]
    fn test_mesh_new() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_mesh_bounding_box() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(DVec3::new(-1.0, -2.0, -3.0));
        mesh.add_vertex(DVec3::new(4.0, 5.0, 6.0));
        let (min, max) = mesh.bounding_box();
        assert_eq!(min, DVec3::new(-1.0, -2.0, -3.0));
        assert_eq!(max, DVec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_tetrahedron_is_closed() {
        let mesh = tetrahedron();
        assert!(mesh.is_closed_manifold());
        assert_relative_eq!(mesh.signed_volume(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_open_mesh_reports_boundary() {
        let mut mesh = tetrahedron();
        mesh.triangles.pop();
        assert!(!mesh.is_closed_manifold());
        assert_eq!(mesh.boundary_edges().len(), 3);
    }

    #[test]
    fn test_mirror_transform_keeps_outward_winding() {
        let mut mesh = tetrahedron();
        mesh.transform(&DMat4::from_scale(DVec3::new(1.0, -1.0, 1.0)));
        assert!(mesh.signed_volume() > 0.0);
        assert!(mesh.is_closed_manifold());
    }

    #[test]
    fn test_weld_merges_duplicates() {
        let mut mesh = tetrahedron();
        let mut split = Mesh::new();
        for tri in mesh.triangles() {
            let [a, b, c] = mesh.triangle_points(*tri);
            let i = split.add_vertex(a);
            split.add_vertex(b + DVec3::splat(1e-9));
            split.add_vertex(c);
            split.add_triangle(i, i + 1, i + 2);
        }
        assert!(!split.is_closed_manifold());
        split.weld(1e-6);
        assert_eq!(split.vertex_count(), 4);
        assert!(split.is_closed_manifold());
        mesh.weld(1e-6);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn test_weld_drops_collapsed_triangles() {
        let mut mesh = Mesh::from_parts(
            vec![DVec3::ZERO, DVec3::new(1e-12, 0.0, 0.0), DVec3::Y],
            vec![[0, 1, 2]],
        );
        mesh.weld(1e-9);
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = tetrahedron();
        let b = tetrahedron();
        a.merge(&b);
        assert_eq!(a.vertex_count(), 8);
        assert_eq!(a.triangles()[4], [4, 6, 5]);
    }

    #[test]
    fn test_buffers() {
        let cube = create_cube(DVec3::splat(2.0), true).unwrap();
        assert_eq!(cube.vertices_f32().len(), cube.vertex_count() * 3);
        assert_eq!(cube.indices_u32().len(), cube.triangle_count() * 3);
    }

    #[test]
    fn test_ensure_closed_reports_open_edges() {
        let mut open = tetrahedron();
        assert!(open.ensure_closed().is_ok());
        open.triangles.pop();
        assert!(matches!(
            open.ensure_closed(),
            Err(ThreadError::NonManifold { boundary_edges: 3 })
        ));
    }

    #[test]
    fn test_repair_t_junctions_closes_split_face() {
        let mut cube = create_cube(DVec3::splat(2.0), true).unwrap();
        let volume = cube.signed_volume();
        let [a, b, c] = cube.triangles[0];
        let mid = cube.add_vertex((cube.vertices[a as usize] + cube.vertices[b as usize]) / 2.0);
        cube.triangles[0] = [a, mid, c];
        cube.triangles.push([mid, b, c]);
        assert!(!cube.is_closed_manifold());

        assert_eq!(cube.repair_t_junctions(VERTEX_MERGE_EPSILON), 1);
        assert!(cube.is_closed_manifold());
        assert_relative_eq!(cube.signed_volume(), volume, epsilon = 1e-12);
    }

    #[test]
    fn test_repair_drops_slivers() {
        let mut mesh = Mesh::from_parts(
            vec![DVec3::ZERO, DVec3::X * 2.0, DVec3::new(1.0, 1e-12, 0.0)],
            vec![[0, 1, 2]],
        );
        mesh.repair_t_junctions(VERTEX_MERGE_EPSILON);
        assert!(mesh.triangles().is_empty());
    }
}
