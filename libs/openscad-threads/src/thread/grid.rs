//! # Helix Grid
//!
//! Samples the swept thread surface on a grid of angular columns. Each
//! column is the profile repeated once per period instance along the axis,
//! placed at one angle, scaled by the pitch, moved out to the working radius
//! and sheared for taper. Periods inside a Higbee zone are flattened to the
//! root (external) or crest (internal).
//!
//! The taper shear stops at the rod ends: covering periods beyond them keep
//! the end radius, so a steep taper cannot push them through the axis.
//!
//! Only the columns of the first start are computed; the other starts are
//! the same columns rotated by `360 / starts` degrees.
//!
//! ## Vertex Layout
//!
//! ```text
//! 0                      bottom apex
//! 1                      top apex
//! 2 + (i*K + k)*N + j    start i, column k < K, point j
//! 2 + s*K*N + i*L + m    tail of start i (last period of its column K)
//! ```
//!
//! Column `K` of start `i` is column `0` of start `i + 1` shifted up by one
//! period, so only its last period needs storage of its own.

use super::higbee::HigbeeOffsets;
use super::profile::NormalizedProfile;
use crate::error::{ThreadError, ThreadResult};
use config::constants::MAX_VERTICES;
use glam::{DMat3, DVec3};
use rayon::prelude::*;
use std::f64::consts::TAU;
use tracing::{debug, warn};

/// Inputs of [`HelixGrid::build`]. Radii are working radii, already
/// inflated for internal threads.
#[derive(Debug, Clone)]
pub struct GridParams<'a> {
    pub profile: &'a NormalizedProfile,
    pub pitch: f64,
    pub length: f64,
    pub r1: f64,
    pub r2: f64,
    pub starts: u32,
    /// Facets per revolution, a multiple of `starts`.
    pub sides: u32,
    pub internal: bool,
    pub higbee: HigbeeOffsets,
    /// Add one covering period below the bottom end.
    pub extend1: bool,
    /// Add one covering period above the top end.
    pub extend2: bool,
}

/// Index arithmetic for the grid vertex arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// Lead starts.
    pub starts: usize,
    /// Columns per start (`K`).
    pub columns: usize,
    /// Points per column (`N`).
    pub column_len: usize,
    /// Points per period (`L`).
    pub period_len: usize,
}

impl GridLayout {
    pub const BOTTOM_APEX: u32 = 0;
    pub const TOP_APEX: u32 = 1;

    /// Total number of vertices in the arena.
    pub fn vertex_count(&self) -> usize {
        2 + self.starts * self.columns * self.column_len + self.starts * self.period_len
    }

    fn tail(&self, start: usize) -> usize {
        2 + self.starts * self.columns * self.column_len + start * self.period_len
    }

    /// Arena index of point `j` of column `k` (`0..=K`) of `start`.
    pub fn index(&self, start: usize, k: usize, j: usize) -> u32 {
        debug_assert!(start < self.starts && k <= self.columns && j < self.column_len);
        let shifted = self.column_len - self.period_len;
        let index = if k < self.columns {
            2 + (start * self.columns + k) * self.column_len + j
        } else if j < shifted {
            2 + ((start + 1) % self.starts * self.columns) * self.column_len + j + self.period_len
        } else {
            self.tail(start) + j - shifted
        };
        index as u32
    }
}

/// Sampled thread surface.
#[derive(Debug, Clone)]
pub struct HelixGrid {
    layout: GridLayout,
    /// Columns `0..=K` of the first start.
    columns: Vec<Vec<DVec3>>,
    apex_bottom: f64,
    apex_top: f64,
}

impl HelixGrid {
    /// Samples every column of the first start in parallel.
    pub fn build(params: &GridParams<'_>) -> ThreadResult<Self> {
        let starts = params.starts as usize;
        if starts == 0 || params.sides == 0 || params.sides % params.starts != 0 {
            return Err(ThreadError::invalid(format!(
                "{} sides cannot be split evenly across {} starts",
                params.sides, params.starts
            )));
        }
        let per_start = (params.sides / params.starts) as usize;
        let period_len = params.profile.len();

        let periods = (params.length / params.pitch).ceil() as i64 + 2;
        let mut lo = -(periods / 2);
        let mut hi = lo + periods;
        if params.extend1 {
            lo -= 1;
        }
        if params.extend2 {
            hi += 1;
        }

        let layout = GridLayout {
            starts,
            columns: per_start,
            column_len: (hi - lo) as usize * period_len,
            period_len,
        };
        if layout.vertex_count() > MAX_VERTICES {
            return Err(ThreadError::invalid(format!(
                "thread needs {} vertices, more than the limit of {MAX_VERTICES}",
                layout.vertex_count()
            )));
        }

        let sampler = ColumnSampler::new(params, lo, hi);
        let columns: Vec<Vec<DVec3>> = (0..=per_start)
            .into_par_iter()
            .map(|k| sampler.column(k as f64 / per_start as f64, k))
            .collect();

        let z_extent = (lo.unsigned_abs().max(hi.unsigned_abs()) + 1) as f64 * params.pitch;
        let innermost =
            sampler.r_mid + params.profile.min_y * params.pitch - sampler.slope.abs() * z_extent;
        if innermost <= 0.0 {
            warn!(
                innermost,
                "taper would cross the axis past the rod ends; holding the end radii there"
            );
        }

        debug!(
            starts,
            columns = per_start,
            column_len = layout.column_len,
            periods = hi - lo,
            "helix grid sampled"
        );

        Ok(Self {
            layout,
            columns,
            apex_bottom: (lo - 1) as f64 * params.pitch,
            apex_top: (hi + 1) as f64 * params.pitch,
        })
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Column `k` (`0..=K`) of the first start.
    pub fn column(&self, k: usize) -> &[DVec3] {
        &self.columns[k]
    }

    /// Builds the vertex arena in [`GridLayout`] order.
    pub fn vertices(&self) -> Vec<DVec3> {
        let layout = &self.layout;
        let mut vertices = Vec::with_capacity(layout.vertex_count());
        vertices.push(DVec3::new(0.0, 0.0, self.apex_bottom));
        vertices.push(DVec3::new(0.0, 0.0, self.apex_top));

        let rotations: Vec<DMat3> = (0..layout.starts)
            .map(|i| DMat3::from_rotation_z(TAU * i as f64 / layout.starts as f64))
            .collect();
        for rotation in &rotations {
            for column in &self.columns[..layout.columns] {
                vertices.extend(column.iter().map(|&p| *rotation * p));
            }
        }
        let tail = &self.columns[layout.columns][layout.column_len - layout.period_len..];
        for rotation in &rotations {
            vertices.extend(tail.iter().map(|&p| *rotation * p));
        }
        vertices
    }
}

/// Per-column geometry shared by all columns.
struct ColumnSampler<'a> {
    profile: &'a NormalizedProfile,
    pitch: f64,
    sides: f64,
    r_mid: f64,
    slope: f64,
    /// Shear stops at `±half_length`.
    half_length: f64,
    flat_y: f64,
    /// Unwound angle of each start over the rod length.
    twist: f64,
    starts: f64,
    higbee1: f64,
    higbee2: f64,
    lo: i64,
    hi: i64,
}

impl<'a> ColumnSampler<'a> {
    fn new(params: &GridParams<'a>, lo: i64, hi: i64) -> Self {
        let starts = f64::from(params.starts);
        Self {
            profile: params.profile,
            pitch: params.pitch,
            sides: f64::from(params.sides),
            r_mid: (params.r1 + params.r2) / 2.0,
            slope: (params.r1 - params.r2) / params.length,
            half_length: params.length / 2.0,
            flat_y: if params.internal {
                params.profile.max_y
            } else {
                params.profile.min_y
            },
            twist: 360.0 * params.length / (params.pitch * starts),
            starts,
            higbee1: params.higbee.end1_or_never(),
            higbee2: params.higbee.end2_or_never(),
            lo,
            hi,
        }
    }

    /// True if period instance `t` at column fraction `frac` lies in a
    /// Higbee zone.
    fn flattened(&self, t: f64, frac: f64) -> bool {
        let angle = (t + frac) * 360.0 / self.starts;
        angle < -self.twist / 2.0 + self.higbee1 || angle > self.twist / 2.0 - self.higbee2
    }

    fn column(&self, frac: f64, k: usize) -> Vec<DVec3> {
        let (sin, cos) = (TAU * k as f64 / self.sides).sin_cos();
        let mut points = Vec::with_capacity((self.hi - self.lo) as usize * self.profile.len());
        for t in self.lo..self.hi {
            let t = t as f64;
            let flat = self.flattened(t, frac);
            for p in &self.profile.points {
                let z = (p.x + t + frac) * self.pitch;
                let y = if flat { self.flat_y } else { p.y };
                let sheared = z.clamp(-self.half_length, self.half_length);
                let radius = self.r_mid + y * self.pitch - self.slope * sheared;
                points.push(DVec3::new(radius * cos, radius * sin, z));
            }
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::profile::Profile;
    use approx::assert_relative_eq;

    fn profile() -> NormalizedProfile {
        Profile::from_pairs(&[[-0.3, -0.5], [-0.1, 0.0], [0.1, 0.0], [0.3, -0.5]])
            .unwrap()
            .normalized(false)
    }

    fn params(profile: &NormalizedProfile, starts: u32, sides: u32) -> GridParams<'_> {
        GridParams {
            profile,
            pitch: 2.0,
            length: 20.0,
            r1: 5.0,
            r2: 5.0,
            starts,
            sides,
            internal: false,
            higbee: HigbeeOffsets { end1: None, end2: None },
            extend1: false,
            extend2: false,
        }
    }

    #[test]
    fn test_layout_counts() {
        let profile = profile();
        let grid = HelixGrid::build(&params(&profile, 2, 8)).unwrap();
        let layout = *grid.layout();
        // 12 periods of 4 points
        assert_eq!(layout.column_len, 48);
        assert_eq!(layout.columns, 4);
        assert_eq!(layout.vertex_count(), 2 + 2 * 4 * 48 + 2 * 4);
        assert_eq!(grid.vertices().len(), layout.vertex_count());
    }

    #[test]
    fn test_seam_column_matches_next_start() {
        let profile = profile();
        let grid = HelixGrid::build(&params(&profile, 3, 12)).unwrap();
        let layout = *grid.layout();
        let vertices = grid.vertices();
        let last = &grid.column(layout.columns)[..layout.column_len];
        let rotation = DMat3::from_rotation_z(TAU / 3.0);
        for (j, &p) in last.iter().enumerate() {
            let mapped = vertices[layout.index(0, layout.columns, j) as usize];
            assert!(mapped.distance(p) < 1e-9, "seam point {j} differs");
        }
        // Start 1 seam lands on start 2 column 0
        for (j, &p) in last.iter().enumerate() {
            let mapped = vertices[layout.index(1, layout.columns, j) as usize];
            assert!(mapped.distance(rotation * p) < 1e-9);
        }
    }

    #[test]
    fn test_taper_reaches_end_radii_at_ends() {
        let profile = profile();
        let mut p = params(&profile, 1, 16);
        p.r1 = 6.0;
        p.r2 = 4.0;
        let grid = HelixGrid::build(&p).unwrap();
        for point in grid.column(0) {
            let expected = 5.0 - 0.1 * point.z.clamp(-10.0, 10.0);
            let radius = point.truncate().length();
            assert!(radius <= expected + 1e-9 && radius >= expected - 1.0 - 1e-9);
        }
    }

    #[test]
    fn test_higbee_flattens_end_periods() {
        let profile = profile();
        let mut p = params(&profile, 1, 16);
        p.higbee = HigbeeOffsets {
            end1: Some(378.0),
            end2: None,
        };
        let grid = HelixGrid::build(&p).unwrap();
        let column = grid.column(0);
        // Periods centred below z = -10 + 1.05 * 2 sit on the root
        for point in column.iter().filter(|q| q.z < -9.0) {
            assert_relative_eq!(point.truncate().length(), 4.0, epsilon = 1e-9);
        }
        let crest = column
            .iter()
            .filter(|q| q.z > 0.0)
            .map(|q| q.truncate().length())
            .fold(0.0, f64::max);
        assert_relative_eq!(crest, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_extension_adds_periods() {
        let profile = profile();
        let mut p = params(&profile, 1, 16);
        p.extend1 = true;
        p.extend2 = true;
        let grid = HelixGrid::build(&p).unwrap();
        assert_eq!(grid.layout().column_len, 14 * 4);
    }

    #[test]
    fn test_steep_taper_keeps_covering_periods_off_axis() {
        let profile = profile();
        let mut p = params(&profile, 1, 16);
        p.pitch = 1.0;
        p.length = 4.0;
        p.r1 = 5.0;
        p.r2 = 1.2;
        let grid = HelixGrid::build(&p).unwrap();
        for point in grid.column(0) {
            let radius = point.truncate().length();
            assert!(radius >= 1.2 - 0.5 - 1e-9, "{point} crossed toward the axis");
            if point.z > 2.0 {
                assert!(radius <= 1.2 + 1e-9);
            }
        }
    }

    #[test]
    fn test_rejects_uneven_sides() {
        let profile = profile();
        assert!(HelixGrid::build(&params(&profile, 3, 16)).is_err());
    }
}
