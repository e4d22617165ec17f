//! # Parametric Profiles
//!
//! Builders for common thread forms, returned in pitch-normalized units
//! ready for [`ThreadSpec`](super::ThreadSpec).

use super::profile::Profile;
use crate::error::{require_positive, ThreadError, ThreadResult};

/// Symmetric trapezoid of the given depth and included flank angle
/// (degrees). ACME uses 29°, metric trapezoidal 30°.
///
/// Fails with [`ThreadError::GeometryImpossible`] when the flanks would
/// cross within one period.
pub fn trapezoidal(pitch: f64, depth: f64, thread_angle: f64) -> ThreadResult<Profile> {
    require_positive("pitch", pitch)?;
    require_positive("thread depth", depth)?;
    if !(0.0..180.0).contains(&thread_angle) {
        return Err(ThreadError::invalid(format!(
            "thread angle must lie in [0, 180), got {thread_angle}"
        )));
    }
    let pa_delta = 0.5 * depth * (thread_angle / 2.0).to_radians().tan() / pitch;
    if pa_delta >= 0.25 {
        return Err(ThreadError::impossible(format!(
            "a {thread_angle}° thread of depth {depth} does not fit in pitch {pitch}"
        )));
    }
    let (z1, z2) = (0.25 - pa_delta, 0.25 + pa_delta);
    let dp = depth / pitch;
    Profile::from_pairs(&[[-z2, -dp], [-z1, 0.0], [z1, 0.0], [z2, -dp]])
}

/// ISO 68-1 metric form with a rounded-off root approximation.
pub fn iso_metric(pitch: f64) -> ThreadResult<Profile> {
    require_positive("pitch", pitch)?;
    let dd = 30f64.to_radians().cos() * 5.0 / 8.0;
    Profile::from_pairs(&[
        [-7.0 / 16.0, -dd * 1.07],
        [-6.0 / 16.0, -dd],
        [-1.0 / 16.0, 0.0],
        [1.0 / 16.0, 0.0],
        [6.0 / 16.0, -dd],
        [7.0 / 16.0, -dd * 1.07],
    ])
}

/// Square thread: half-pitch deep, straight flanks.
pub fn square(pitch: f64) -> ThreadResult<Profile> {
    trapezoidal(pitch, pitch / 2.0, 0.0)
}

/// 7°/45° buttress form. Load flank on the low-x side.
pub fn buttress(pitch: f64) -> ThreadResult<Profile> {
    require_positive("pitch", pitch)?;
    Profile::from_pairs(&[
        [-1.0 / 2.0, -0.77],
        [-7.0 / 16.0, -0.75],
        [5.0 / 16.0, 0.0],
        [7.0 / 16.0, 0.0],
        [7.0 / 16.0, -0.75],
        [15.0 / 32.0, -0.77],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trapezoidal_shape() {
        let profile = trapezoidal(2.0, 1.0, 60.0).unwrap();
        let points = profile.points();
        let delta = 0.5 * 1.0 * 30f64.to_radians().tan() / 2.0;
        assert_relative_eq!(points[2].x, 0.25 - delta, epsilon = 1e-12);
        assert_relative_eq!(points[3].x, 0.25 + delta, epsilon = 1e-12);
        assert_relative_eq!(profile.depth(2.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trapezoidal_too_deep() {
        assert!(matches!(
            trapezoidal(1.0, 1.0, 60.0),
            Err(ThreadError::GeometryImpossible { .. })
        ));
        assert!(trapezoidal(1.0, 0.5, 180.0).is_err());
        assert!(trapezoidal(0.0, 0.5, 30.0).is_err());
    }

    #[test]
    fn test_iso_depth() {
        let profile = iso_metric(1.5).unwrap();
        let expected = 1.5 * 30f64.to_radians().cos() * 5.0 / 8.0 * 1.07;
        assert_relative_eq!(profile.depth(1.5), expected, epsilon = 1e-12);
        assert_eq!(profile.max_y(), 0.0);
    }

    #[test]
    fn test_square_has_vertical_flanks() {
        let profile = square(2.0).unwrap();
        let points = profile.points();
        assert_eq!(points[0].x, points[1].x);
        assert_eq!(profile.depth(2.0), 1.0);
    }

    #[test]
    fn test_buttress_extents() {
        let profile = buttress(3.0).unwrap();
        assert_eq!(profile.min_x(), -0.5);
        assert_eq!(profile.max_x(), 15.0 / 32.0);
    }
}
