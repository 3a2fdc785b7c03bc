//! Error type shared by resolution, hashing, composition and caching.

use std::path::PathBuf;

use thiserror::Error;

use crate::bundle::TransformError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Error type for asset resolution and bundle building.
///
/// Lower-level failures ([`PathNotFound`](Self::PathNotFound),
/// [`Io`](Self::Io)) travel unchanged from the resolver through the composer
/// and the cache, so the caller can decide between a missing-asset response
/// and a hard failure.
///
/// # Example
///
/// ```ignore
/// match pipeline.get("site") {
///     Ok(served) => respond(served.bytes),
///     Err(e) if e.is_not_found() => respond_404(),
///     Err(e) => respond_500(e),
/// }
/// ```
#[derive(Debug, Error)]
pub enum BundleError {
    /// A required virtual path does not resolve to an existing file.
    #[error("file not found: {path}")]
    PathNotFound {
        /// The virtual path as the caller supplied it.
        path: String,
    },

    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// Physical path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A bundle definition or configuration value is structurally invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong.
        reason: String,
    },

    /// A virtual or physical path cannot be mapped.
    #[error("invalid path `{path}`: {reason}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No bundle is registered under the requested name.
    #[error("no bundle named `{name}`")]
    BundleNotFound {
        /// The requested bundle name.
        name: String,
    },

    /// A transform failed while composing a bundle.
    #[error("failed to compose bundle `{bundle}`: {source}")]
    Composition {
        /// Bundle being composed.
        bundle: String,
        /// The first failure encountered.
        #[source]
        source: TransformError,
    },
}

impl BundleError {
    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check whether this error means "the requested thing does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PathNotFound { .. } | Self::BundleNotFound { .. })
    }
}
