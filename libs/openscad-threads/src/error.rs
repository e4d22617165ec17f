//! # Thread Errors
//!
//! Error types for thread generation. Every failure is a validation error
//! raised before any geometry is built, so callers never see partial output.

use config::constants::ConfigError;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type ThreadResult<T> = Result<T, ThreadError>;

/// Errors that can occur while generating thread geometry.
#[derive(Debug, Error)]
pub enum ThreadError {
    /// A parameter is out of range or malformed.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The requested geometry cannot exist (e.g. thread deeper than the rod).
    #[error("Geometry impossible: {message}")]
    GeometryImpossible { message: String },

    /// The combination of options is not supported.
    #[error("Unsupported: {message}")]
    Unsupported { message: String },

    /// Global settings failed validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A boolean operation produced no usable geometry.
    #[error("Boolean {operation} failed: {message}")]
    BooleanFailed {
        operation: &'static str,
        message: String,
    },

    /// A mesh that must be closed has open or doubled edges.
    #[error("Mesh is not a closed manifold: {boundary_edges} unmatched edges")]
    NonManifold { boundary_edges: usize },

    /// Writing an export failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ThreadError {
    /// Creates an invalid argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a geometry impossible error.
    pub fn impossible(message: impl Into<String>) -> Self {
        Self::GeometryImpossible {
            message: message.into(),
        }
    }

    /// Creates an unsupported configuration error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Creates a boolean failure error.
    pub fn boolean_failed(operation: &'static str, message: impl Into<String>) -> Self {
        Self::BooleanFailed {
            operation,
            message: message.into(),
        }
    }
}

/// Fails with [`ThreadError::InvalidArgument`] unless `value` is finite and
/// strictly positive.
pub(crate) fn require_positive(name: &str, value: f64) -> ThreadResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ThreadError::invalid(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}
