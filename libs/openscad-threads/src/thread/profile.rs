//! # Thread Profiles
//!
//! A profile is one thread period in pitch-normalized units: `x` runs along
//! the axis within `[-0.5, 0.5]`, `y = 0` sits on the nominal diameter and
//! negative `y` goes into the root. The gap between consecutive periods is
//! implied, so a profile never repeats its own start one period later.

use crate::error::{ThreadError, ThreadResult};
use config::constants::EPSILON;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Validated thread cross-section.
///
/// # Example
///
/// ```rust
/// use openscad_threads::Profile;
///
/// let profile = Profile::from_pairs(&[[-0.4, -0.5], [-0.1, 0.0], [0.1, 0.0], [0.4, -0.5]]).unwrap();
/// assert_eq!(profile.depth(2.0), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DVec2>", into = "Vec<DVec2>")]
pub struct Profile {
    points: Vec<DVec2>,
}

impl Profile {
    /// Validates and wraps a list of points.
    ///
    /// Fails with [`ThreadError::InvalidArgument`] when there are fewer than
    /// two points, a coordinate is not finite, an `x` leaves `[-0.5, 0.5]`,
    /// or the last point duplicates the first one a period later.
    pub fn new(points: Vec<DVec2>) -> ThreadResult<Self> {
        if points.len() < 2 {
            return Err(ThreadError::invalid(format!(
                "thread profile needs at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(ThreadError::invalid(format!(
                "thread profile point {p} is not finite"
            )));
        }
        if let Some(p) = points.iter().find(|p| p.x.abs() > 0.5 + EPSILON) {
            return Err(ThreadError::invalid(format!(
                "thread profile x must lie in [-0.5, 0.5], got {}",
                p.x
            )));
        }
        let (first, last) = (points[0], points[points.len() - 1]);
        if last.distance(first + DVec2::X) <= EPSILON {
            return Err(ThreadError::invalid(
                "thread profile must not repeat its first point one period later",
            ));
        }
        Ok(Self { points })
    }

    /// Builds a profile from `[x, y]` pairs.
    pub fn from_pairs(pairs: &[[f64; 2]]) -> ThreadResult<Self> {
        Self::new(pairs.iter().map(|&p| DVec2::from(p)).collect())
    }

    /// Profile points in order.
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    /// Smallest `x`.
    pub fn min_x(&self) -> f64 {
        self.points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min)
    }

    /// Largest `x`.
    pub fn max_x(&self) -> f64 {
        self.points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max)
    }

    /// Deepest point (most negative `y`).
    pub fn min_y(&self) -> f64 {
        self.points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min)
    }

    /// Highest point.
    pub fn max_y(&self) -> f64 {
        self.points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max)
    }

    /// Thread depth at the given pitch.
    pub fn depth(&self, pitch: f64) -> f64 {
        -self.min_y() * pitch
    }

    /// Returns the profile swept by the thread generator.
    ///
    /// External threads use the profile as given. Internal threads split it
    /// at `x = 0` and swap the halves with a half-period offset, turning the
    /// form into its negative-space complement.
    pub fn normalized(&self, internal: bool) -> NormalizedProfile {
        let mut points: Vec<DVec2> = if internal {
            let right = self
                .points
                .iter()
                .filter(|p| p.x >= 0.0)
                .map(|p| DVec2::new(p.x - 0.5, p.y));
            let left = self
                .points
                .iter()
                .filter(|p| p.x < 0.0)
                .map(|p| DVec2::new(p.x + 0.5, p.y));
            right.chain(left).collect()
        } else {
            self.points.clone()
        };
        points.dedup_by(|b, a| a.distance(*b) <= EPSILON);

        NormalizedProfile {
            points,
            min_y: self.min_y(),
            max_y: self.max_y(),
        }
    }
}

impl TryFrom<Vec<DVec2>> for Profile {
    type Error = ThreadError;

    fn try_from(points: Vec<DVec2>) -> ThreadResult<Self> {
        Self::new(points)
    }
}

impl From<Profile> for Vec<DVec2> {
    fn from(profile: Profile) -> Self {
        profile.points
    }
}

/// Profile ready for sweeping, with the extremes the grid builder needs.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedProfile {
    /// Points of one period, no consecutive duplicates.
    pub points: Vec<DVec2>,
    /// Root level (flattening target for external threads).
    pub min_y: f64,
    /// Crest level (flattening target for internal threads).
    pub max_y: f64,
}

impl NormalizedProfile {
    /// Number of points per period.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the profile has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trapezoid() -> Profile {
        Profile::from_pairs(&[[-0.3, -0.5], [-0.1, 0.0], [0.1, 0.0], [0.3, -0.5]]).unwrap()
    }

    #[test]
    fn test_extremes_and_depth() {
        let profile = trapezoid();
        assert_eq!(profile.min_x(), -0.3);
        assert_eq!(profile.max_x(), 0.3);
        assert_eq!(profile.min_y(), -0.5);
        assert_eq!(profile.max_y(), 0.0);
        assert_eq!(profile.depth(3.0), 1.5);
    }

    #[test]
    fn test_external_is_unchanged() {
        let profile = trapezoid();
        assert_eq!(profile.normalized(false).points, profile.points());
    }

    #[test]
    fn test_internal_swaps_halves() {
        let normalized = trapezoid().normalized(true);
        let expected = [
            DVec2::new(-0.4, 0.0),
            DVec2::new(-0.2, -0.5),
            DVec2::new(0.2, -0.5),
            DVec2::new(0.4, 0.0),
        ];
        assert_eq!(normalized.len(), 4);
        for (a, b) in normalized.points.iter().zip(expected) {
            assert!(a.distance(b) < 1e-12);
        }
    }

    #[test]
    fn test_internal_twice_recovers_profile() {
        let original = trapezoid();
        let once = Profile::new(original.normalized(true).points).unwrap();
        let twice = once.normalized(true);
        for (a, b) in twice.points.iter().zip(original.points()) {
            assert!(a.distance(*b) < 1e-12);
        }
    }

    #[test]
    fn test_internal_keeps_distinct_seam_points() {
        let profile = Profile::from_pairs(&[[-0.5, 0.0], [0.0, -0.5], [0.5, 0.0]]);
        // Last point repeats the first one a period later
        assert!(profile.is_err());

        let profile = Profile::from_pairs(&[[-0.5, -0.2], [0.0, 0.0], [0.5, -0.1]]).unwrap();
        let normalized = profile.normalized(true);
        // 0.5 -> 0.0 and -0.5 -> 0.0 land on different y, so nothing merges
        assert_eq!(normalized.len(), 3);
    }

    #[test]
    fn test_rejects_malformed_profiles() {
        assert!(Profile::from_pairs(&[[0.0, 0.0]]).is_err());
        assert!(Profile::from_pairs(&[[-0.6, 0.0], [0.0, 0.0]]).is_err());
        assert!(Profile::from_pairs(&[[0.0, f64::NAN], [0.1, 0.0]]).is_err());
    }

    #[test]
    fn test_serde_validates() {
        let profile: Profile = serde_json::from_str("[[-0.25, -0.5], [0.25, 0.0]]").unwrap();
        assert_eq!(profile.points().len(), 2);
        assert!(serde_json::from_str::<Profile>("[[0.0, 0.0]]").is_err());
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, "[[-0.25,-0.5],[0.25,0.0]]");
    }
}
