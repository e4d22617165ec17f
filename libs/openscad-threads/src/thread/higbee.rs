//! # End Modifiers and Higbee Truncation
//!
//! Per-end options are given as "both ends" plus optional per-end overrides
//! and are resolved once, up front, into an [`EndModifiers`] pair. The
//! Higbee calculation then turns each end's option into the angle (degrees
//! along the unwound helix) from that end inside which the thread is
//! flattened.

use super::profile::Profile;
use crate::error::{ThreadError, ThreadResult};
use serde::{Deserialize, Serialize};

// =============================================================================
// END OVERRIDES
// =============================================================================

/// A value for both ends with optional per-end overrides.
///
/// Precedence: per-end value, then `both`, then the caller's default.
///
/// # Example
///
/// ```rust
/// use openscad_threads::EndOverrides;
///
/// let bevel = EndOverrides::both(true).with_end2(false);
/// assert_eq!(bevel.resolve(false), (true, false));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndOverrides<T> {
    /// Value for both ends.
    pub both: Option<T>,
    /// Override for the bottom end.
    pub end1: Option<T>,
    /// Override for the top end.
    pub end2: Option<T>,
}

impl<T> Default for EndOverrides<T> {
    fn default() -> Self {
        Self {
            both: None,
            end1: None,
            end2: None,
        }
    }
}

impl<T: Copy> EndOverrides<T> {
    /// Same value at both ends.
    pub fn both(value: T) -> Self {
        Self {
            both: Some(value),
            ..Self::default()
        }
    }

    /// Sets the bottom end override.
    #[must_use]
    pub fn with_end1(mut self, value: T) -> Self {
        self.end1 = Some(value);
        self
    }

    /// Sets the top end override.
    #[must_use]
    pub fn with_end2(mut self, value: T) -> Self {
        self.end2 = Some(value);
        self
    }

    /// Resolves `(end1, end2)`.
    pub fn resolve(&self, default: T) -> (T, T) {
        let base = self.both.unwrap_or(default);
        (self.end1.unwrap_or(base), self.end2.unwrap_or(base))
    }
}

// =============================================================================
// END MODIFIERS
// =============================================================================

/// Blunt-start setting for one end.
///
/// `Offset(0.0)` means "enabled with the default angle", which is distinct
/// from `Disabled`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Higbee {
    /// No truncation at this end.
    Disabled,
    /// Truncate at the standard angle.
    Default,
    /// Truncate at the standard angle plus this many degrees.
    Offset(f64),
}

impl Higbee {
    /// Extra degrees on top of the standard angle, `None` when disabled.
    pub fn extra_degrees(self) -> Option<f64> {
        match self {
            Higbee::Disabled => None,
            Higbee::Default => Some(0.0),
            Higbee::Offset(degrees) => Some(degrees),
        }
    }
}

/// Treatment of one rod end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndModifier {
    /// Cut (external) or fill (internal) a 45° bevel at this end.
    pub bevel: bool,
    /// Blunt-start setting.
    pub higbee: Higbee,
}

/// Resolved treatments of the bottom (`end1`) and top (`end2`) ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndModifiers {
    pub end1: EndModifier,
    pub end2: EndModifier,
}

impl EndModifiers {
    /// Applies end precedence. Bevels default off. Higbee defaults on for
    /// internal threads and off for external ones.
    pub fn resolve(bevel: &EndOverrides<bool>, higbee: &EndOverrides<Higbee>, internal: bool) -> Self {
        let default_higbee = if internal {
            Higbee::Default
        } else {
            Higbee::Disabled
        };
        let (bevel1, bevel2) = bevel.resolve(false);
        let (higbee1, higbee2) = higbee.resolve(default_higbee);
        Self {
            end1: EndModifier {
                bevel: bevel1,
                higbee: higbee1,
            },
            end2: EndModifier {
                bevel: bevel2,
                higbee: higbee2,
            },
        }
    }
}

// =============================================================================
// HIGBEE CALCULATION
// =============================================================================

/// Flattening angles per end in degrees, `None` where truncation is off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HigbeeOffsets {
    pub end1: Option<f64>,
    pub end2: Option<f64>,
}

impl HigbeeOffsets {
    /// Effective end1 angle for the flattening test; disabled ends sit far
    /// outside any swept range.
    pub(crate) fn end1_or_never(&self) -> f64 {
        self.end1.unwrap_or(f64::NEG_INFINITY)
    }

    pub(crate) fn end2_or_never(&self) -> f64 {
        self.end2.unwrap_or(f64::NEG_INFINITY)
    }
}

/// Computes the flattening angle at each end.
///
/// The standard angle leaves about a quarter period between the last full
/// thread and the end face: `(180 + (0.25 - edge) * 360) / starts`, where
/// `edge` is `min_x` of the profile at the bottom and `-max_x` at the top.
/// Explicit offsets are added on top.
///
/// # Example
///
/// ```rust
/// use openscad_threads::{higbee_offsets, EndModifiers, EndOverrides, Higbee, Profile};
///
/// let profile = Profile::from_pairs(&[[-0.25, -0.5], [0.25, 0.0]]).unwrap();
/// let ends = EndModifiers::resolve(&EndOverrides::default(), &EndOverrides::both(Higbee::Default), false);
/// let offsets = higbee_offsets(&profile, &ends, 1).unwrap();
/// assert_eq!(offsets.end1, Some(360.0));
/// ```
pub fn higbee_offsets(profile: &Profile, ends: &EndModifiers, starts: u32) -> ThreadResult<HigbeeOffsets> {
    if starts == 0 {
        return Err(ThreadError::invalid("thread needs at least one start"));
    }
    let standard = |edge: f64| (180.0 + (0.25 - edge) * 360.0) / f64::from(starts);

    let offset = |higbee: Higbee, edge: f64| -> ThreadResult<Option<f64>> {
        match higbee.extra_degrees() {
            None => Ok(None),
            Some(extra) if extra.is_finite() => Ok(Some(standard(edge) + extra)),
            Some(extra) => Err(ThreadError::invalid(format!(
                "higbee offset must be finite, got {extra}"
            ))),
        }
    };

    Ok(HigbeeOffsets {
        end1: offset(ends.end1.higbee, profile.min_x())?,
        end2: offset(ends.end2.higbee, -profile.max_x())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::profiles;
    use approx::assert_relative_eq;

    fn ends(higbee: EndOverrides<Higbee>, internal: bool) -> EndModifiers {
        EndModifiers::resolve(&EndOverrides::default(), &higbee, internal)
    }

    #[test]
    fn test_override_precedence() {
        let o = EndOverrides::<u8>::default();
        assert_eq!(o.resolve(7), (7, 7));
        let o = EndOverrides::both(1u8);
        assert_eq!(o.resolve(7), (1, 1));
        let o = EndOverrides::both(1u8).with_end1(2);
        assert_eq!(o.resolve(7), (2, 1));
        let o = EndOverrides::default().with_end2(3u8);
        assert_eq!(o.resolve(7), (7, 3));
    }

    #[test]
    fn test_higbee_defaults_follow_internal_flag() {
        let external = ends(EndOverrides::default(), false);
        assert_eq!(external.end1.higbee, Higbee::Disabled);
        assert_eq!(external.end2.higbee, Higbee::Disabled);

        let internal = ends(EndOverrides::default(), true);
        assert_eq!(internal.end1.higbee, Higbee::Default);
        assert_eq!(internal.end2.higbee, Higbee::Default);

        let internal = ends(EndOverrides::default().with_end2(Higbee::Disabled), true);
        assert_eq!(internal.end2.higbee, Higbee::Disabled);
    }

    #[test]
    fn test_zero_offset_is_not_disabled() {
        let profile = profiles::trapezoidal(1.0, 0.3, 30.0).unwrap();
        let zero = higbee_offsets(&profile, &ends(EndOverrides::both(Higbee::Offset(0.0)), false), 1).unwrap();
        let default = higbee_offsets(&profile, &ends(EndOverrides::both(Higbee::Default), false), 1).unwrap();
        assert_eq!(zero, default);
        assert!(zero.end1.is_some());
    }

    #[test]
    fn test_symmetric_profile_offsets() {
        let profile = Profile::from_pairs(&[[-0.3, -0.5], [-0.1, 0.0], [0.1, 0.0], [0.3, -0.5]]).unwrap();
        let offsets = higbee_offsets(&profile, &ends(EndOverrides::both(Higbee::Default), false), 1).unwrap();
        assert_relative_eq!(offsets.end1.unwrap(), 378.0, epsilon = 1e-9);
        assert_relative_eq!(offsets.end2.unwrap(), 378.0, epsilon = 1e-9);

        let offsets = higbee_offsets(&profile, &ends(EndOverrides::both(Higbee::Default), false), 3).unwrap();
        assert_relative_eq!(offsets.end1.unwrap(), 126.0, epsilon = 1e-9);
    }

    #[test]
    fn test_explicit_offset_adds_degrees() {
        let profile = Profile::from_pairs(&[[-0.25, -0.5], [0.25, 0.0]]).unwrap();
        let higbee = EndOverrides::both(Higbee::Default).with_end2(Higbee::Offset(-45.0));
        let offsets = higbee_offsets(&profile, &ends(higbee, false), 2).unwrap();
        assert_relative_eq!(offsets.end1.unwrap(), 180.0, epsilon = 1e-9);
        assert_relative_eq!(offsets.end2.unwrap(), 135.0, epsilon = 1e-9);
    }

    #[test]
    fn test_buttress_internal_adds_three_quarter_turn() {
        let profile = profiles::buttress(1.0).unwrap();
        let offsets = higbee_offsets(&profile, &ends(EndOverrides::default(), true), 1).unwrap();
        // min_x = -1/2 puts the bottom end 270° past the 180° base
        assert_relative_eq!(offsets.end1.unwrap(), 180.0 + 270.0, epsilon = 1e-9);
    }

    #[test]
    fn test_disabled_and_invalid() {
        let profile = Profile::from_pairs(&[[-0.25, -0.5], [0.25, 0.0]]).unwrap();
        let offsets = higbee_offsets(&profile, &ends(EndOverrides::default(), false), 1).unwrap();
        assert_eq!(offsets.end1, None);
        assert_eq!(offsets.end1_or_never(), f64::NEG_INFINITY);

        let bad = ends(EndOverrides::both(Higbee::Offset(f64::NAN)), false);
        assert!(higbee_offsets(&profile, &bad, 1).is_err());
        assert!(higbee_offsets(&profile, &ends(EndOverrides::default(), false), 0).is_err());
    }

    #[test]
    fn test_higbee_serde_shape() {
        let json = serde_json::to_string(&Higbee::Offset(10.0)).unwrap();
        assert_eq!(json, r#"{"offset":10.0}"#);
        let parsed: Higbee = serde_json::from_str(r#""default""#).unwrap();
        assert_eq!(parsed, Higbee::Default);
    }
}
