//! # Threaded Rods
//!
//! Entry point for threaded rods and internal thread masks.
//!
//! ## Pipeline
//!
//! ```text
//! ThreadSpec ──► validate ──► working radii ──► Higbee offsets
//!                                                    │
//!          ThreadedRod ◄── end treatments ◄── assemble ◄── helix grid
//! ```
//!
//! The returned [`ThreadedRod`] holds the closed sweep, which runs a few
//! periods past each end, together with the solids that trim it.
//! [`ThreadedRod::to_mesh`] applies them through the boolean layer.

use super::assemble::{assemble, check_depth, thread_sides, working_radii};
use super::caps::{end_treatments, CapParams, EndTreatments};
use super::grid::{GridParams, HelixGrid};
use super::higbee::{higbee_offsets, EndModifiers, EndOverrides, Higbee};
use super::profile::Profile;
use crate::error::{require_positive, ThreadError, ThreadResult};
use crate::mesh::Mesh;
use crate::ops::boolean::{difference, union};
use config::constants::GlobalConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// THREAD SPEC
// =============================================================================

fn one() -> u32 {
    1
}

/// Parameters of a threaded rod.
///
/// # Example
///
/// ```rust
/// use openscad_threads::{profiles, ThreadSpec};
///
/// let spec = ThreadSpec::new(profiles::iso_metric(1.5).unwrap(), 1.5, 10.0, 20.0)
///     .with_starts(2)
///     .left_handed(true);
/// assert_eq!(spec.d1, 10.0);
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadSpec {
    pub profile: Profile,
    /// Axial distance between neighbouring periods.
    pub pitch: f64,
    /// Nominal diameter at the bottom end.
    pub d1: f64,
    /// Nominal diameter at the top end.
    pub d2: f64,
    pub length: f64,
    #[serde(default = "one")]
    pub starts: u32,
    #[serde(default)]
    pub left_handed: bool,
    /// Build a mask for cutting internal threads.
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub bevel: EndOverrides<bool>,
    #[serde(default)]
    pub higbee: EndOverrides<Higbee>,
}

impl ThreadSpec {
    /// Right-handed, single-start, external, cylindrical thread.
    pub fn new(profile: Profile, pitch: f64, diameter: f64, length: f64) -> Self {
        Self {
            profile,
            pitch,
            d1: diameter,
            d2: diameter,
            length,
            starts: 1,
            left_handed: false,
            internal: false,
            bevel: EndOverrides::default(),
            higbee: EndOverrides::default(),
        }
    }

    /// Tapered thread from `d1` at the bottom to `d2` at the top.
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
    pub fn internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    #[must_use]
    pub fn with_bevel(mut self, bevel: EndOverrides<bool>) -> Self {
        self.bevel = bevel;
        self
    }

    #[must_use]
    pub fn with_higbee(mut self, higbee: EndOverrides<Higbee>) -> Self {
        self.higbee = higbee;
        self
    }

    /// Checks the scalar parameters.
    pub fn validate(&self) -> ThreadResult<()> {
        require_positive("pitch", self.pitch)?;
        require_positive("length", self.length)?;
        require_positive("bottom diameter", self.d1)?;
        require_positive("top diameter", self.d2)?;
        if self.starts == 0 {
            return Err(ThreadError::invalid("thread needs at least one start"));
        }
        Ok(())
    }

    /// End treatments after applying the "both ends, then per end" precedence.
    pub fn end_modifiers(&self) -> EndModifiers {
        EndModifiers::resolve(&self.bevel, &self.higbee, self.internal)
    }
}

// =============================================================================
// THREADED ROD
// =============================================================================

/// A generated thread: the closed sweep plus the solids that trim it.
#[derive(Debug, Clone)]
pub struct ThreadedRod {
    sweep: Mesh,
    treatments: EndTreatments,
    radii: (f64, f64),
    sides: u32,
}

impl ThreadedRod {
    /// Closed helical sweep, extending past both ends.
    pub fn sweep(&self) -> &Mesh {
        &self.sweep
    }

    /// Solids removed from the sweep: slabs or bevel wedges past each end.
    pub fn cutters(&self) -> &[Mesh] {
        &self.treatments.cutters
    }

    /// Bevel cones added to internal masks.
    pub fn fills(&self) -> &[Mesh] {
        &self.treatments.fills
    }

    /// Swept radii at the bottom and top ends.
    pub fn working_radii(&self) -> (f64, f64) {
        self.radii
    }

    /// Facets per revolution.
    pub fn sides(&self) -> u32 {
        self.sides
    }

    /// Takes the sweep, dropping the end treatments.
    pub fn into_sweep(self) -> Mesh {
        self.sweep
    }

    /// Trims the sweep to its length and applies bevels.
    ///
    /// The result is a closed manifold; anything else is reported as
    /// [`ThreadError::NonManifold`].
    pub fn to_mesh(&self) -> ThreadResult<Mesh> {
        let mut mesh = self.sweep.clone();
        for cutter in &self.treatments.cutters {
            mesh = difference(&mesh, cutter)?;
        }
        for fill in &self.treatments.fills {
            mesh = union(&mesh, fill)?;
        }
        if mesh.is_empty() {
            return Err(ThreadError::boolean_failed(
                "difference",
                "end trimming removed the whole thread",
            ));
        }
        mesh.ensure_closed()?;
        Ok(mesh)
    }
}

/// Builds a threaded rod, or an internal thread mask when `spec.internal`
/// is set.
///
/// # Errors
///
/// - [`ThreadError::InvalidArgument`] for non-positive pitch, length or
///   diameters and for zero starts.
/// - [`ThreadError::GeometryImpossible`] when the thread depth reaches either
///   working radius, or a bevel would reach the axis.
///
/// # Example
///
/// ```rust
/// use openscad_threads::{generic_threaded_rod, profiles, ThreadSpec};
/// use config::constants::GlobalConfig;
///
/// let spec = ThreadSpec::new(profiles::trapezoidal(2.0, 1.0, 30.0).unwrap(), 2.0, 10.0, 8.0);
/// let rod = generic_threaded_rod(&spec, &GlobalConfig::default().with_fn(16)).unwrap();
/// assert!(rod.sweep().is_closed_manifold());
/// ```
pub fn generic_threaded_rod(spec: &ThreadSpec, config: &GlobalConfig) -> ThreadResult<ThreadedRod> {
    spec.validate()?;

    let sides = thread_sides(config, spec.d1.max(spec.d2) / 2.0, spec.starts);
    let (r1, r2) = working_radii(spec.d1 / 2.0, spec.d2 / 2.0, sides, spec.internal, config.slop);
    let depth = spec.profile.depth(spec.pitch);
    check_depth(depth, r1, r2)?;

    let ends = spec.end_modifiers();
    let higbee = higbee_offsets(&spec.profile, &ends, spec.starts)?;
    let profile = spec.profile.normalized(spec.internal);

    let grid = HelixGrid::build(&GridParams {
        profile: &profile,
        pitch: spec.pitch,
        length: spec.length,
        r1,
        r2,
        starts: spec.starts,
        sides,
        internal: spec.internal,
        higbee,
        extend1: spec.internal && ends.end1.higbee == Higbee::Disabled,
        extend2: spec.internal && ends.end2.higbee == Higbee::Disabled,
    })?;
    let sweep = assemble(&grid, spec.internal, spec.left_handed);
    sweep.ensure_closed()?;

    let treatments = end_treatments(&CapParams {
        length: spec.length,
        pitch: spec.pitch,
        r1,
        r2,
        max_y: profile.max_y,
        depth,
        internal: spec.internal,
        ends,
        segments: sides,
    })?;

    info!(
        pitch = spec.pitch,
        length = spec.length,
        starts = spec.starts,
        internal = spec.internal,
        sides,
        triangles = sweep.triangle_count(),
        "threaded rod generated"
    );

    Ok(ThreadedRod {
        sweep,
        treatments,
        radii: (r1, r2),
        sides,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thread::profiles;
    use approx::assert_relative_eq;

    const PI_12: f64 = std::f64::consts::PI / 12.0;

    fn config() -> GlobalConfig {
        GlobalConfig::default().with_fn(12)
    }

    fn spec() -> ThreadSpec {
        ThreadSpec::new(profiles::trapezoidal(1.0, 0.5, 30.0).unwrap(), 1.0, 8.0, 4.0)
    }

    #[test]
    fn test_rod_sweep_is_closed() {
        let rod = generic_threaded_rod(&spec(), &config()).unwrap();
        assert!(rod.sweep().is_closed_manifold());
        assert_eq!(rod.sides(), 12);
        assert_eq!(rod.cutters().len(), 2);
        assert!(rod.fills().is_empty());
    }

    #[test]
    fn test_validation_errors() {
        let mut s = spec();
        s.pitch = 0.0;
        assert!(matches!(
            generic_threaded_rod(&s, &config()),
            Err(ThreadError::InvalidArgument { .. })
        ));
        let s = spec().with_starts(0);
        assert!(generic_threaded_rod(&s, &config()).is_err());
        let s = spec().with_diameters(0.8, 8.0);
        assert!(matches!(
            generic_threaded_rod(&s, &config()),
            Err(ThreadError::GeometryImpossible { .. })
        ));
    }

    #[test]
    fn test_internal_uses_inflated_radius() {
        let rod = generic_threaded_rod(&spec().internal(true), &config()).unwrap();
        let (r1, r2) = rod.working_radii();
        let expected = 4.0 / PI_12.cos();
        assert_relative_eq!(r1, expected, epsilon = 1e-12);
        assert_relative_eq!(r2, expected, epsilon = 1e-12);
        assert_relative_eq!(rod.sweep().max_radius(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_slop_widens_internal_only() {
        let config = config().with_slop(0.1).unwrap();
        let external = generic_threaded_rod(&spec(), &config).unwrap();
        assert_eq!(external.working_radii(), (4.0, 4.0));
        let internal = generic_threaded_rod(&spec().internal(true), &config).unwrap();
        assert_relative_eq!(internal.working_radii().0, 4.0 / PI_12.cos() + 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_internal_disabled_higbee_extends_sweep() {
        let plain = generic_threaded_rod(&spec().internal(true), &config()).unwrap();
        let extended = generic_threaded_rod(
            &spec()
                .internal(true)
                .with_higbee(EndOverrides::both(Higbee::Disabled)),
            &config(),
        )
        .unwrap();
        let (lo_a, hi_a) = plain.sweep().bounding_box();
        let (lo_b, hi_b) = extended.sweep().bounding_box();
        assert_relative_eq!(lo_a.z - lo_b.z, 1.0, epsilon = 1e-9);
        assert_relative_eq!(hi_b.z - hi_a.z, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_to_mesh_trims_to_length() {
        let rod = generic_threaded_rod(&spec(), &GlobalConfig::default().with_fn(8)).unwrap();
        let mesh = rod.to_mesh().unwrap();
        let (min, max) = mesh.bounding_box();
        assert_relative_eq!(min.z, -2.0, epsilon = 1e-6);
        assert_relative_eq!(max.z, 2.0, epsilon = 1e-6);
        assert!(mesh.signed_volume() > 0.0);
        assert!(mesh.signed_volume() < rod.sweep().signed_volume());
    }

    #[test]
    fn test_spec_serde_defaults() {
        let json = r#"{
            "profile": [[-0.25, -0.5], [0.25, 0.0]],
            "pitch": 2.0,
            "d1": 10.0,
            "d2": 10.0,
            "length": 20.0
        }"#;
        let spec: ThreadSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.starts, 1);
        assert!(!spec.internal);
        assert_eq!(spec.bevel, EndOverrides::default());
        let back: ThreadSpec = serde_json::from_str(&serde_json::to_string(&spec).unwrap()).unwrap();
        assert_eq!(back, spec);
    }
}
