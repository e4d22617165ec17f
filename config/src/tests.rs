//! # Tests for Config Constants
//!
//! Unit tests verifying the correctness of configuration constants
//! and helper functions.

use crate::constants::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_epsilon_is_positive() {
    assert!(EPSILON > 0.0, "EPSILON must be positive");
}

#[test]
fn test_vertex_merge_epsilon_larger_than_epsilon() {
    assert!(
        VERTEX_MERGE_EPSILON >= EPSILON,
        "VERTEX_MERGE_EPSILON should be >= EPSILON"
    );
}

// =============================================================================
// RESOLUTION TESTS
// =============================================================================

#[test]
fn test_default_resolution_matches_openscad() {
    assert_eq!(DEFAULT_FN, 0.0);
    assert_eq!(DEFAULT_FA, 12.0);
    assert_eq!(DEFAULT_FS, 2.0);
}

#[test]
fn test_compute_fragments_with_fn_override() {
    let fragments = compute_fragments(10.0, 32.0, DEFAULT_FA, DEFAULT_FS);
    assert_eq!(fragments, 32);
}

#[test]
fn test_compute_fragments_clamps_to_min() {
    let fragments = compute_fragments(10.0, 1.0, DEFAULT_FA, DEFAULT_FS);
    assert_eq!(fragments, MIN_FRAGMENTS);
}

#[test]
fn test_compute_fragments_clamps_to_max() {
    let fragments = compute_fragments(10.0, 100000.0, DEFAULT_FA, DEFAULT_FS);
    assert_eq!(fragments, MAX_FRAGMENTS);
}

#[test]
fn test_compute_fragments_fs_dominates() {
    // 2*PI*10 / 2 = 31.4 -> 32
    let fragments = compute_fragments(10.0, 0.0, 0.1, 2.0);
    let expected = ((2.0 * std::f64::consts::PI * 10.0) / 2.0).ceil() as u32;
    assert_eq!(fragments, expected);
}

#[test]
fn test_compute_fragments_fa_dominates() {
    let fragments = compute_fragments(100.0, 0.0, 12.0, 0.01);
    assert_eq!(fragments, 30);
}

// =============================================================================
// GLOBAL CONFIG TESTS
// =============================================================================

#[test]
fn test_default_config_is_valid() {
    let cfg = GlobalConfig::default();
    assert!(cfg.tolerance > 0.0);
    assert_eq!(cfg.slop, DEFAULT_SLOP);
    assert!(cfg.segments(5.0) >= MIN_FRAGMENTS);
}

#[test]
fn test_new_rejects_bad_tolerance() {
    assert_eq!(
        GlobalConfig::new(0.0, 0.0, 0.0, 12.0, 2.0).unwrap_err(),
        ConfigError::InvalidTolerance(0.0)
    );
}

#[test]
fn test_new_rejects_negative_slop() {
    assert_eq!(
        GlobalConfig::new(1e-9, -0.1, 0.0, 12.0, 2.0).unwrap_err(),
        ConfigError::InvalidSlop(-0.1)
    );
    assert!(GlobalConfig::default().with_slop(f64::NAN).is_err());
}

#[test]
fn test_new_rejects_bad_resolution() {
    assert!(matches!(
        GlobalConfig::new(1e-9, 0.0, -1.0, 12.0, 2.0),
        Err(ConfigError::InvalidResolution { .. })
    ));
    assert!(GlobalConfig::new(1e-9, 0.0, 0.0, 0.0, 2.0).is_err());
}

#[test]
fn test_with_fn_fixes_segments() {
    let cfg = GlobalConfig::default().with_fn(24);
    assert_eq!(cfg.segments(1.0), 24);
    assert_eq!(cfg.segments(100.0), 24);
}

#[test]
fn test_config_error_display() {
    let msg = ConfigError::InvalidSlop(-1.0).to_string();
    assert!(msg.contains("slop"));
}

// =============================================================================
// NUT PROPORTION TESTS
// =============================================================================

#[test]
fn test_nut_proportions_are_fractions() {
    for value in [
        INNER_BEVEL_RATIO,
        NUT_CORNER_SHRINK,
        NUT_CHAMFER_SPAN,
        NUT_EDGE_CHAMFER_RATIO,
    ] {
        assert!(value > 0.0 && value < 1.0);
    }
    assert!(DEFAULT_NUT_BEVEL_ANGLE > 0.0 && DEFAULT_NUT_BEVEL_ANGLE < 90.0);
}
