//! # Configuration Constants
//!
//! Centralized constants for the threading pipeline. All tolerances,
//! tessellation parameters and hardware proportions are defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Resolution**: Default tessellation parameters ($fn, $fa, $fs)
//! - **Clearance**: Manufacturing slop applied to internal threads
//! - **Nut**: Proportions used when building nut bodies
//! - **Limits**: Maximum values for safety bounds

use std::fmt;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Epsilon for vertex deduplication.
///
/// Used when welding the polygon soup produced by boolean operations back
/// into an indexed mesh.
///
/// # Example
///
/// ```rust
/// use config::constants::{EPSILON, VERTEX_MERGE_EPSILON};
/// assert!(VERTEX_MERGE_EPSILON > EPSILON);
/// ```
pub const VERTEX_MERGE_EPSILON: f64 = 1e-7;

/// Plane thickness used when classifying points during BSP boolean
/// operations.
///
/// Coarser than [`EPSILON`] so that nearly coplanar faces produced by
/// repeated splitting are still treated as coplanar.
pub const BSP_EPSILON: f64 = 1e-5;

// =============================================================================
// RESOLUTION CONSTANTS (OpenSCAD $fn, $fa, $fs)
// =============================================================================

/// Default value for $fn (fragment count override).
///
/// When $fn > 0, it specifies the exact number of fragments for circular
/// shapes. When $fn = 0, the fragment count is calculated from $fa and $fs.
pub const DEFAULT_FN: f64 = 0.0;

/// Default value for $fa (minimum fragment angle in degrees).
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_FA;
///
/// // Maximum fragments from angle: 360 / $fa
/// let max_from_angle = 360.0 / DEFAULT_FA; // = 30 fragments
/// assert_eq!(max_from_angle, 30.0);
/// ```
pub const DEFAULT_FA: f64 = 12.0;

/// Default value for $fs (minimum fragment size).
pub const DEFAULT_FS: f64 = 2.0;

/// Minimum number of fragments for any circular shape.
pub const MIN_FRAGMENTS: u32 = 5;

/// Maximum number of fragments for any circular shape.
///
/// Safety limit to prevent excessive tessellation of long, fine threads.
pub const MAX_FRAGMENTS: u32 = 1000;

/// Smallest depth scale applied inside a helix taper.
///
/// Keeps the end rings of a tapered helical sweep from collapsing to a
/// line, which would leave the end caps with zero area.
pub const HELIX_TAPER_FLOOR: f64 = 0.01;

// =============================================================================
// CLEARANCE CONSTANTS
// =============================================================================

/// Default clearance ("slop") added to internal thread radii.
///
/// Zero reproduces the nominal geometry exactly; printers typically want
/// 0.1 to 0.2 mm.
pub const DEFAULT_SLOP: f64 = 0.0;

// =============================================================================
// THREAD END CONSTANTS
// =============================================================================

/// Length of the trimming solids beyond each rod end, in pitches.
pub const END_CUTTER_PITCHES: f64 = 5.0;

/// Distance a bevel fill cone pokes past the end face of an internal mask.
pub const BEVEL_FILL_OVERLAP: f64 = 0.001;

/// Flank angle in degrees of a helix ridge built from a depth alone.
pub const DEFAULT_HELIX_FLANK_ANGLE: f64 = 15.0;

/// Revolutions of a helix ridge when none are given.
pub const DEFAULT_HELIX_TURNS: f64 = 2.0;

// =============================================================================
// NUT CONSTANTS
// =============================================================================

/// Extra height added to a nut bore so the cutter pokes through both faces.
pub const NUT_BORE_EXTRA: f64 = 0.01;

/// Inner bevel size of a plain bore as a fraction of its diameter.
pub const INNER_BEVEL_RATIO: f64 = 0.05;

/// Shrink factor applied to the corner diameter of the bevel solid.
pub const NUT_CORNER_SHRINK: f64 = 0.99;

/// Divisor spreading the corner bevel slightly into the flats.
pub const NUT_CHAMFER_SPAN: f64 = 0.9;

/// Edge chamfer of non-beveled nut ends as a fraction of the nut width.
pub const NUT_EDGE_CHAMFER_RATIO: f64 = 0.01;

/// Default outer bevel angle in degrees, measured from the end face.
pub const DEFAULT_NUT_BEVEL_ANGLE: f64 = 30.0;

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Maximum number of vertices in a single mesh.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_VERTICES;
///
/// let vertex_count = 1000;
/// assert!(vertex_count < MAX_VERTICES);
/// ```
pub const MAX_VERTICES: usize = 10_000_000;

// =============================================================================
// GLOBAL CONFIGURATION
// =============================================================================

/// Immutable snapshot of the settings every entry point reads.
///
/// # Examples
/// ```
/// use config::constants::GlobalConfig;
/// let config = GlobalConfig::default();
/// assert!(config.tolerance > 0.0);
/// assert_eq!(config.slop, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalConfig {
    /// Numeric tolerance propagated into geometry kernels.
    pub tolerance: f64,
    /// Clearance added to internal thread radii.
    pub slop: f64,
    /// $fn override (0 = use $fa/$fs).
    pub fn_: f64,
    /// $fa minimum fragment angle in degrees.
    pub fa: f64,
    /// $fs minimum fragment size.
    pub fs: f64,
}

impl GlobalConfig {
    /// Builds a configuration enforcing strict validation of every value.
    ///
    /// # Examples
    /// ```
    /// use config::constants::GlobalConfig;
    /// let cfg = GlobalConfig::new(1.0e-6, 0.1, 0.0, 6.0, 1.0).expect("valid config");
    /// assert_eq!(cfg.slop, 0.1);
    /// ```
    pub fn new(tolerance: f64, slop: f64, fn_: f64, fa: f64, fs: f64) -> Result<Self, ConfigError> {
        if !(tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        if !(slop >= 0.0) || !slop.is_finite() {
            return Err(ConfigError::InvalidSlop(slop));
        }
        if !(fn_ >= 0.0) || !(fa > 0.0) || !(fs > 0.0) {
            return Err(ConfigError::InvalidResolution { fn_, fa, fs });
        }
        Ok(Self {
            tolerance,
            slop,
            fn_,
            fa,
            fs,
        })
    }

    /// Returns a copy with a fixed fragment count.
    ///
    /// # Examples
    /// ```
    /// use config::constants::GlobalConfig;
    /// let cfg = GlobalConfig::default().with_fn(24);
    /// assert_eq!(cfg.segments(10.0), 24);
    /// ```
    #[must_use]
    pub fn with_fn(mut self, fn_: u32) -> Self {
        self.fn_ = f64::from(fn_);
        self
    }

    /// Returns a copy with a different clearance.
    ///
    /// Negative or non-finite values are rejected.
    pub fn with_slop(self, slop: f64) -> Result<Self, ConfigError> {
        Self::new(self.tolerance, slop, self.fn_, self.fa, self.fs)
    }

    /// Number of circular facets for the given radius.
    pub fn segments(&self, radius: f64) -> u32 {
        compute_fragments(radius, self.fn_, self.fa, self.fs)
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            tolerance: EPSILON,
            slop: DEFAULT_SLOP,
            fn_: DEFAULT_FN,
            fa: DEFAULT_FA,
            fs: DEFAULT_FS,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Raised when tolerance is zero or negative.
    InvalidTolerance(f64),
    /// Raised when the clearance is negative or not finite.
    InvalidSlop(f64),
    /// Raised when $fn is negative or $fa/$fs are not positive.
    InvalidResolution {
        /// Offending $fn.
        fn_: f64,
        /// Offending $fa.
        fa: f64,
        /// Offending $fs.
        fs: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "tolerance must be positive: {value}")
            }
            ConfigError::InvalidSlop(value) => {
                write!(f, "slop must be a non-negative finite number: {value}")
            }
            ConfigError::InvalidResolution { fn_, fa, fs } => {
                write!(f, "invalid resolution: $fn={fn_}, $fa={fa}, $fs={fs}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Computes the number of fragments for a circular shape.
///
/// Implements OpenSCAD's resolution formula:
/// - If $fn > 0: use $fn (clamped to MIN_FRAGMENTS..MAX_FRAGMENTS)
/// - Otherwise: ceil(min(360/$fa, 2*PI*r/$fs)) clamped to MIN_FRAGMENTS..MAX_FRAGMENTS
///
/// # Example
///
/// ```rust
/// use config::constants::{compute_fragments, DEFAULT_FA, DEFAULT_FS};
///
/// let fragments = compute_fragments(10.0, 32.0, DEFAULT_FA, DEFAULT_FS);
/// assert_eq!(fragments, 32);
///
/// let fragments = compute_fragments(10.0, 0.0, DEFAULT_FA, DEFAULT_FS);
/// assert!(fragments >= 5);
/// ```
pub fn compute_fragments(radius: f64, fn_value: f64, fa_value: f64, fs_value: f64) -> u32 {
    let fragments = if fn_value > 0.0 {
        fn_value as u32
    } else {
        let from_angle = 360.0 / fa_value;
        let from_size = (2.0 * std::f64::consts::PI * radius.abs()) / fs_value;
        from_angle.min(from_size).ceil() as u32
    };

    fragments.clamp(MIN_FRAGMENTS, MAX_FRAGMENTS)
}
