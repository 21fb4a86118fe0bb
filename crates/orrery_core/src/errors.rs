//! Error Types
//!
//! This module defines the error types used throughout the runtime.
//!
//! # Overview
//!
//! Failures are split by the phase of the scene lifecycle that produces them:
//!
//! - [`ConfigError`]: invalid scene-construction parameters. Detected while
//!   building the base scene and fatal to that build call only.
//! - [`AssetError`]: a single resource failed to load or decode. Scoped to the
//!   object that depends on it; the rest of the scene keeps running.
//! - [`DrawError`]: the backend failed to produce a frame. Fatal, propagated
//!   to the host without any recovery attempt.
//!
//! All of them convert into the umbrella [`Error`], and public APIs that can
//! fail in more than one phase return [`Result<T>`].
//!
//! ```rust,ignore
//! use orrery_core::errors::{ConfigError, Result};
//!
//! fn check_far(far: f32) -> Result<()> {
//!     if far <= 0.0 {
//!         return Err(ConfigError::out_of_range("camera.far", far, "> 0").into());
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use thiserror::Error;

/// The main error type for the runtime.
#[derive(Error, Debug)]
pub enum Error {
    /// Scene construction failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A resource failed to load.
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// A frame could not be drawn.
    #[error("Draw error: {0}")]
    Draw(#[from] DrawError),

    /// File I/O error outside the asset loader.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Windowing / event loop failure reported by the host platform.
    #[error("Platform error: {0}")]
    Platform(String),
}

/// Invalid parameters passed to the scene graph builder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The configuration does not describe a camera.
    #[error("Scene config has no camera")]
    MissingCamera,

    /// A numeric parameter lies outside its valid range.
    #[error("{field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        /// Dotted path of the offending field, e.g. `lights[0].shadow.far`
        field: String,
        /// The rejected value
        value: f32,
        /// Human readable constraint
        expected: &'static str,
    },

    /// A structural parameter is inconsistent (e.g. a degenerate direction).
    #[error("Invalid {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// A preset could not be parsed.
    #[error("Failed to parse scene config: {0}")]
    Parse(String),
}

impl ConfigError {
    #[must_use]
    pub fn out_of_range(field: impl Into<String>, value: f32, expected: &'static str) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value,
            expected,
        }
    }

    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failure to load one resource.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    /// The reader has no data under this path.
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Reading the bytes failed.
    #[error("Failed to read {path}: {message}")]
    Io {
        /// Requested path
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// The bytes could not be decoded into the requested kind.
    #[error("Failed to decode {path}: {message}")]
    Decode {
        /// Requested path
        path: String,
        /// Decoder message
        message: String,
    },

    /// The load did not finish within the configured timeout.
    #[error("Loading {path} timed out after {after:?}")]
    Timeout {
        /// Requested path
        path: String,
        /// Configured timeout
        after: Duration,
    },

    /// The load task was cancelled or panicked before producing a result.
    #[error("Loading {0} was cancelled")]
    Cancelled(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} while fetching {url}")]
    Http {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The source URI cannot be served by any compiled-in reader.
    #[error("Unsupported asset source: {0}")]
    UnsupportedSource(String),

    /// A material declares a channel whose texture is absent from the resolved set.
    #[error("Material channel {channel} has no resolved texture ({path})")]
    MissingChannel {
        /// Channel name
        channel: &'static str,
        /// Declared source path
        path: String,
    },
}

impl AssetError {
    /// Returns the path of the resource this error refers to.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound(path)
            | Self::Cancelled(path)
            | Self::UnsupportedSource(path)
            | Self::Io { path, .. }
            | Self::Decode { path, .. }
            | Self::Timeout { path, .. }
            | Self::MissingChannel { path, .. } => path,
            Self::Http { url, .. } => url,
        }
    }
}

/// Failure while drawing a frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    /// The presentation surface was lost and must be recreated by the host.
    #[error("Surface lost")]
    SurfaceLost,

    /// The surface refused to hand out a frame.
    #[error("Surface error: {0}")]
    Surface(String),

    /// The scene has no active camera to draw through.
    #[error("Scene has no active camera")]
    NoActiveCamera,

    /// Any other backend failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_error_reports_its_path() {
        let err = AssetError::Timeout {
            path: "earth_map.jpg".into(),
            after: Duration::from_secs(3),
        };
        assert_eq!(err.path(), "earth_map.jpg");

        let err = AssetError::Http {
            url: "https://example.org/envmap.hdr".into(),
            status: 404,
        };
        assert_eq!(err.path(), "https://example.org/envmap.hdr");
    }

    #[test]
    fn config_error_converts_into_umbrella() {
        let err: Error = ConfigError::out_of_range("camera.far", -1.0, "> near").into();
        assert!(matches!(err, Error::Config(ConfigError::OutOfRange { .. })));
        assert_eq!(
            err.to_string(),
            "Config error: camera.far = -1 is out of range (expected > near)"
        );
    }
}
