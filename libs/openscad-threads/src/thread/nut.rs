//! # Threaded Nuts
//!
//! A nut is a chamfered hex or square prism, optionally intersected with a
//! revolved solid that bevels its corners, minus a bore. The bore is either
//! a plain flared cylinder (`pitch == 0`) or an internal thread mask from
//! [`generic_threaded_rod`].

use super::assemble::thread_sides;
use super::higbee::{EndOverrides, Higbee};
use super::profile::Profile;
use super::rod::{generic_threaded_rod, ThreadSpec};
use crate::error::{require_positive, ThreadError, ThreadResult};
use crate::mesh::Mesh;
use crate::ops::boolean::{difference, intersection};
use crate::primitives::{chamfered_prism, revolve};
use config::constants::{
    GlobalConfig, DEFAULT_NUT_BEVEL_ANGLE, INNER_BEVEL_RATIO, NUT_BORE_EXTRA, NUT_CHAMFER_SPAN,
    NUT_CORNER_SHRINK, NUT_EDGE_CHAMFER_RATIO,
};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

// =============================================================================
// NUT SHAPE
// =============================================================================

/// Outline of the nut body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutShape {
    Hex,
    Square,
}

impl NutShape {
    /// Polygon side count.
    pub fn sides(self) -> u32 {
        match self {
            NutShape::Hex => 6,
            NutShape::Square => 4,
        }
    }

    /// Corner-to-corner diameter for a flat-to-flat `width`.
    pub fn corner_diameter(self, width: f64) -> f64 {
        match self {
            NutShape::Hex => 2.0 * width / 3f64.sqrt(),
            NutShape::Square => width * std::f64::consts::SQRT_2,
        }
    }

    /// Hex nuts are beveled by default, square nuts are not.
    pub fn default_bevel(self) -> bool {
        self == NutShape::Hex
    }
}

impl FromStr for NutShape {
    type Err = ThreadError;

    fn from_str(s: &str) -> ThreadResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hex" | "hexagon" => Ok(NutShape::Hex),
            "square" => Ok(NutShape::Square),
            other => Err(ThreadError::unsupported(format!("unknown nut shape '{other}'"))),
        }
    }
}

impl fmt::Display for NutShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NutShape::Hex => write!(f, "hex"),
            NutShape::Square => write!(f, "square"),
        }
    }
}

// =============================================================================
// NUT SPEC
// =============================================================================

fn one() -> u32 {
    1
}

fn default_bevel_angle() -> f64 {
    DEFAULT_NUT_BEVEL_ANGLE
}

/// Parameters of a nut.
///
/// # Example
///
/// ```rust
/// use openscad_threads::{NutShape, NutSpec};
///
/// let nut = NutSpec::plain(13.0, 8.0, 6.5).with_shape(NutShape::Square);
/// assert!(nut.validate().is_ok());
/// assert!(nut.thread_spec().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutSpec {
    /// Thread profile, required when `pitch > 0`.
    #[serde(default)]
    pub profile: Option<Profile>,
    /// Thread pitch; zero gives an unthreaded bore.
    pub pitch: f64,
    /// Flat-to-flat width.
    pub width: f64,
    /// Bore diameter at the bottom face.
    pub d1: f64,
    /// Bore diameter at the top face.
    pub d2: f64,
    pub height: f64,
    pub shape: NutShape,
    #[serde(default = "one")]
    pub starts: u32,
    #[serde(default)]
    pub left_handed: bool,
    /// Corner bevels; default on for hex, off for square.
    #[serde(default)]
    pub bevel: EndOverrides<bool>,
    /// Corner bevel angle in degrees from the end face.
    #[serde(default = "default_bevel_angle")]
    pub bevel_angle: f64,
    /// Bore flares; default on.
    #[serde(default)]
    pub inner_bevel: EndOverrides<bool>,
    #[serde(default)]
    pub higbee: EndOverrides<Higbee>,
}

impl NutSpec {
    /// Hex nut with a threaded bore of the given nominal diameter.
    pub fn threaded(profile: Profile, pitch: f64, width: f64, diameter: f64, height: f64) -> Self {
        Self {
            profile: Some(profile),
            pitch,
            ..Self::plain(width, diameter, height)
        }
    }

    /// Hex nut with an unthreaded bore.
    pub fn plain(width: f64, diameter: f64, height: f64) -> Self {
        Self {
            profile: None,
            pitch: 0.0,
            width,
            d1: diameter,
            d2: diameter,
            height,
            shape: NutShape::Hex,
            starts: 1,
            left_handed: false,
            bevel: EndOverrides::default(),
            bevel_angle: DEFAULT_NUT_BEVEL_ANGLE,
            inner_bevel: EndOverrides::default(),
            higbee: EndOverrides::default(),
        }
    }

    #[must_use]
    pub fn with_shape(mut self, shape: NutShape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub fn with_diameters(mut self, d1: f64, d2: f64) -> Self {
        self.d1 = d1;
        self.d2 = d2;
        self
    }

    #[must_use]
    pub fn with_starts(mut self, starts: u32) -> Self {
        self.starts = starts;
        self
    }

    #[must_use]
    pub fn left_handed(mut self, left_handed: bool) -> Self {
        self.left_handed = left_handed;
        self
    }

    #[must_use]
    pub fn with_bevel(mut self, bevel: EndOverrides<bool>) -> Self {
        self.bevel = bevel;
        self
    }

    #[must_use]
    pub fn with_inner_bevel(mut self, inner_bevel: EndOverrides<bool>) -> Self {
        self.inner_bevel = inner_bevel;
        self
    }

    #[must_use]
    pub fn with_higbee(mut self, higbee: EndOverrides<Higbee>) -> Self {
        self.higbee = higbee;
        self
    }

    pub fn validate(&self) -> ThreadResult<()> {
        require_positive("nut width", self.width)?;
        require_positive("nut height", self.height)?;
        require_positive("bottom bore diameter", self.d1)?;
        require_positive("top bore diameter", self.d2)?;
        if !(self.pitch.is_finite() && self.pitch >= 0.0) {
            return Err(ThreadError::invalid(format!(
                "nut pitch must be zero or positive, got {}",
                self.pitch
            )));
        }
        if self.pitch > 0.0 && self.profile.is_none() {
            return Err(ThreadError::invalid("threaded nut needs a thread profile"));
        }
        let bore = self.d1.max(self.d2);
        if self.width <= bore {
            return Err(ThreadError::impossible(format!(
                "nut width {} must exceed the bore diameter {bore}",
                self.width
            )));
        }
        if !(self.bevel_angle > 0.0 && self.bevel_angle < 90.0) {
            return Err(ThreadError::invalid(format!(
                "nut bevel angle must lie in (0, 90), got {}",
                self.bevel_angle
            )));
        }
        Ok(())
    }

    /// Internal thread cut through the nut, `None` for a plain bore.
    pub fn thread_spec(&self) -> Option<ThreadSpec> {
        let profile = self.profile.clone().filter(|_| self.pitch > 0.0)?;
        Some(
            ThreadSpec::new(profile, self.pitch, self.d1, self.height + NUT_BORE_EXTRA)
                .with_diameters(self.d1, self.d2)
                .with_starts(self.starts)
                .left_handed(self.left_handed)
                .internal(true)
                .with_bevel(self.inner_bevel_resolved())
                .with_higbee(self.higbee),
        )
    }

    fn inner_bevel_resolved(&self) -> EndOverrides<bool> {
        let (end1, end2) = self.inner_bevel.resolve(true);
        EndOverrides::default().with_end1(end1).with_end2(end2)
    }
}

// =============================================================================
// NUT ASSEMBLY
// =============================================================================

/// Builds a nut, centered on the origin with its axis along Z.
///
/// # Errors
///
/// - [`ThreadError::InvalidArgument`] for non-positive sizes or a threaded
///   nut without a profile.
/// - [`ThreadError::GeometryImpossible`] when the bore does not fit inside
///   the nut or the corner bevels meet.
/// - Errors of [`generic_threaded_rod`] for the bore thread.
///
/// # Example
///
/// ```rust
/// use openscad_threads::{generic_threaded_nut, NutSpec};
/// use config::constants::GlobalConfig;
///
/// let nut = generic_threaded_nut(&NutSpec::plain(10.0, 5.0, 4.0), &GlobalConfig::default()).unwrap();
/// assert!(nut.signed_volume() > 0.0);
/// ```
pub fn generic_threaded_nut(spec: &NutSpec, config: &GlobalConfig) -> ThreadResult<Mesh> {
    spec.validate()?;

    let body = nut_body(spec, config)?;
    let bore = match spec.thread_spec() {
        Some(thread) => generic_threaded_rod(&thread, config)?.to_mesh()?,
        None => plain_bore(spec, config)?,
    };
    let nut = difference(&body, &bore)?;
    if nut.is_empty() {
        return Err(ThreadError::boolean_failed(
            "difference",
            "bore removed the whole nut",
        ));
    }
    nut.ensure_closed()?;

    info!(
        shape = %spec.shape,
        width = spec.width,
        height = spec.height,
        threaded = spec.pitch > 0.0,
        triangles = nut.triangle_count(),
        "nut generated"
    );
    Ok(nut)
}

/// Prism with edge chamfers, intersected with the corner bevel solid when
/// either end is beveled.
fn nut_body(spec: &NutSpec, config: &GlobalConfig) -> ThreadResult<Mesh> {
    let sides = spec.shape.sides();
    let (bevel1, bevel2) = spec.bevel.resolve(spec.shape.default_bevel());
    let edge = spec.width * NUT_EDGE_CHAMFER_RATIO;
    let prism = chamfered_prism(
        sides,
        spec.width / 2.0,
        spec.height,
        if bevel1 { 0.0 } else { edge },
        if bevel2 { 0.0 } else { edge },
    )?;
    if !bevel1 && !bevel2 {
        return Ok(prism);
    }

    let corner = spec.shape.corner_diameter(spec.width);
    let radius = NUT_CORNER_SHRINK * corner / 2.0;
    let chamfer = (corner - spec.width) / 2.0 / NUT_CHAMFER_SPAN;
    let drop = chamfer * spec.bevel_angle.to_radians().tan();
    let half = (spec.height + NUT_BORE_EXTRA) / 2.0;
    let drop1 = if bevel1 { drop } else { 0.0 };
    let drop2 = if bevel2 { drop } else { 0.0 };
    if drop1 + drop2 >= 2.0 * half {
        return Err(ThreadError::impossible(format!(
            "corner bevels of {drop} meet inside a nut of height {}",
            spec.height
        )));
    }

    let profile = [
        DVec2::new(0.0, -half),
        DVec2::new(if bevel1 { radius - chamfer } else { radius }, -half),
        DVec2::new(radius, -half + drop1),
        DVec2::new(radius, half - drop2),
        DVec2::new(if bevel2 { radius - chamfer } else { radius }, half),
        DVec2::new(0.0, half),
    ];
    let segments = thread_sides(config, spec.width / 2.0, sides);
    let bevel = revolve(&profile, segments)?;
    intersection(&prism, &bevel)
}

/// Unthreaded bore, widened by the clearance and flared at inner-beveled
/// ends.
fn plain_bore(spec: &NutSpec, config: &GlobalConfig) -> ThreadResult<Mesh> {
    let (flare1, flare2) = spec.inner_bevel.resolve(true);
    let rb = (spec.d1 + 4.0 * config.slop) / 2.0;
    let rt = (spec.d2 + 4.0 * config.slop) / 2.0;
    let f1 = if flare1 { INNER_BEVEL_RATIO * spec.d1 } else { 0.0 };
    let f2 = if flare2 { INNER_BEVEL_RATIO * spec.d2 } else { 0.0 };
    let half = (spec.height + NUT_BORE_EXTRA) / 2.0;

    let profile = [
        DVec2::new(0.0, -half),
        DVec2::new(rb + f1, -half),
        DVec2::new(rb, -half + f1),
        DVec2::new(rt, half - f2),
        DVec2::new(rt + f2, half),
        DVec2::new(0.0, half),
    ];
    revolve(&profile, config.segments(rb.max(rt)))
}
