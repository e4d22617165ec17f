//! # Thread Helix
//!
//! A bare helical thread ridge for wrapping onto an existing shaft or into
//! an existing bore. This module only builds the cross-section and the
//! taper angles; the sweep itself is [`helix_sweep`].
//!
//! Profiles here are closed polygons in pitch units with `x` along the axis
//! and `y` pointing away from the base surface.

use super::assemble::{thread_sides, working_radii};
use super::higbee::EndOverrides;
use crate::error::{require_positive, ThreadError, ThreadResult};
use crate::mesh::Mesh;
use crate::ops::sweep::{helix_sweep, HelixSweepParams};
use config::constants::{GlobalConfig, DEFAULT_HELIX_FLANK_ANGLE, DEFAULT_HELIX_TURNS};
use glam::{DMat4, DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::info;

fn one() -> u32 {
    1
}

fn default_turns() -> f64 {
    DEFAULT_HELIX_TURNS
}

/// Parameters of a thread helix.
///
/// Give either `depth` (with an optional `flank_angle`) or an explicit
/// `profile`, not both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelixSpec {
    /// Base diameter at the start.
    pub d1: f64,
    /// Base diameter at the end.
    pub d2: f64,
    pub pitch: f64,
    #[serde(default)]
    pub depth: Option<f64>,
    /// Flank angle in degrees from the radial direction.
    #[serde(default)]
    pub flank_angle: Option<f64>,
    #[serde(default)]
    pub profile: Option<Vec<DVec2>>,
    #[serde(default = "one")]
    pub starts: u32,
    #[serde(default = "default_turns")]
    pub turns: f64,
    #[serde(default)]
    pub left_handed: bool,
    /// Ridge points inward, for wrapping into a bore.
    #[serde(default)]
    pub internal: bool,
    /// Degrees of rotation over which the ridge grows in at each end.
    #[serde(default)]
    pub taper: EndOverrides<f64>,
}

impl HelixSpec {
    /// Trapezoidal ridge of the given depth on a cylinder.
    pub fn new(diameter: f64, pitch: f64, depth: f64) -> Self {
        Self {
            depth: Some(depth),
            ..Self::base(diameter, pitch)
        }
    }

    /// Ridge with an explicit cross-section.
    pub fn with_profile(diameter: f64, pitch: f64, profile: Vec<DVec2>) -> Self {
        Self {
            profile: Some(profile),
            ..Self::base(diameter, pitch)
        }
    }

    fn base(diameter: f64, pitch: f64) -> Self {
        Self {
            d1: diameter,
            d2: diameter,
            pitch,
            depth: None,
            flank_angle: None,
            profile: None,
            starts: 1,
            turns: DEFAULT_HELIX_TURNS,
            left_handed: false,
            internal: false,
            taper: EndOverrides::default(),
        }
    }

    #[must_use]
    pub fn with_diameters(mut self, d1: f64, d2: f64) -> Self {
        self.d1 = d1;
        self.d2 = d2;
        self
    }

    #[must_use]
    pub fn with_flank_angle(mut self, degrees: f64) -> Self {
        self.flank_angle = Some(degrees);
        self
    }

    #[must_use]
    pub fn with_starts(mut self, starts: u32) -> Self {
        self.starts = starts;
        self
    }

    #[must_use]
    pub fn with_turns(mut self, turns: f64) -> Self {
        self.turns = turns;
        self
    }

    #[must_use]
    pub fn left_handed(mut self, left_handed: bool) -> Self {
        self.left_handed = left_handed;
        self
    }

    #[must_use]
    pub fn internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    #[must_use]
    pub fn with_taper(mut self, taper: EndOverrides<f64>) -> Self {
        self.taper = taper;
        self
    }

    /// Cross-section in absolute units.
    pub fn cross_section(&self) -> ThreadResult<Vec<DVec2>> {
        let points = match (&self.profile, self.depth, self.flank_angle) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(ThreadError::unsupported(
                    "give either a helix profile or a depth and flank angle, not both",
                ))
            }
            (Some(profile), None, None) => profile.clone(),
            (None, None, _) => {
                return Err(ThreadError::invalid("helix needs a depth or a profile"))
            }
            (None, Some(depth), flank) => {
                ridge(self.pitch, depth, flank.unwrap_or(DEFAULT_HELIX_FLANK_ANGLE))?
            }
        };
        if points.len() < 3 || points.iter().any(|p| !p.is_finite()) {
            return Err(ThreadError::invalid(
                "helix profile needs at least 3 finite points",
            ));
        }
        Ok(points.into_iter().map(|p| p * self.pitch).collect())
    }
}

/// Symmetric trapezoidal ridge in pitch units.
fn ridge(pitch: f64, depth: f64, flank_angle: f64) -> ThreadResult<Vec<DVec2>> {
    require_positive("helix depth", depth)?;
    if !(0.0..90.0).contains(&flank_angle) {
        return Err(ThreadError::invalid(format!(
            "flank angle must lie in [0, 90), got {flank_angle}"
        )));
    }
    let tdp = depth / pitch;
    let dz = tdp * flank_angle.to_radians().tan();
    let cap = (1.0 - 2.0 * dz) / 2.0;
    if cap <= 0.0 {
        return Err(ThreadError::impossible(format!(
            "flanks of a {flank_angle}° ridge of depth {depth} meet within pitch {pitch}"
        )));
    }
    Ok(vec![
        DVec2::new(cap / 2.0 + dz, 0.0),
        DVec2::new(cap / 2.0, tdp),
        DVec2::new(-cap / 2.0, tdp),
        DVec2::new(-cap / 2.0 - dz, 0.0),
    ])
}

/// Builds a helical thread ridge centered on the origin.
///
/// # Example
///
/// ```rust
/// use openscad_threads::{thread_helix, HelixSpec};
/// use config::constants::GlobalConfig;
///
/// let spec = HelixSpec::new(10.0, 2.0, 1.0).with_turns(1.5);
/// let mesh = thread_helix(&spec, &GlobalConfig::default()).unwrap();
/// assert!(mesh.is_closed_manifold());
/// ```
pub fn thread_helix(spec: &HelixSpec, config: &GlobalConfig) -> ThreadResult<Mesh> {
    require_positive("pitch", spec.pitch)?;
    require_positive("bottom diameter", spec.d1)?;
    require_positive("top diameter", spec.d2)?;
    require_positive("turns", spec.turns)?;
    if spec.starts == 0 {
        return Err(ThreadError::invalid("helix needs at least one start"));
    }
    let (taper1, taper2) = spec.taper.resolve(0.0);
    if !(taper1 >= 0.0 && taper2 >= 0.0) {
        return Err(ThreadError::invalid(format!(
            "helix taper must be non-negative, got {taper1} and {taper2}"
        )));
    }

    let section = spec.cross_section()?;
    let sides = thread_sides(config, spec.d1.max(spec.d2) / 2.0, spec.starts);
    let (r1, r2) = working_radii(spec.d1 / 2.0, spec.d2 / 2.0, sides, spec.internal, config.slop);
    let height = spec.pitch * f64::from(spec.starts) * spec.turns;
    let params = HelixSweepParams {
        r1,
        r2,
        height,
        turns: spec.turns,
        segments: sides,
        taper1,
        taper2,
        internal: spec.internal,
    };

    let sweep = helix_sweep(&section, &params)?;
    let mut mesh = Mesh::new();
    for i in 0..spec.starts {
        let mut start = sweep.clone();
        if i > 0 {
            let angle = TAU * f64::from(i) / f64::from(spec.starts);
            start.transform(&DMat4::from_rotation_z(angle));
        }
        mesh.merge(&start);
    }
    mesh.translate(DVec3::new(0.0, 0.0, -height / 2.0));
    if spec.left_handed {
        mesh.transform(&DMat4::from_scale(DVec3::new(1.0, -1.0, 1.0)));
    }

    info!(
        starts = spec.starts,
        turns = spec.turns,
        height,
        triangles = mesh.triangle_count(),
        "thread helix generated"
    );
    Ok(mesh)
}
