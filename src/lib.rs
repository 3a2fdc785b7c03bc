//! # asset-bundle
//!
//! Virtual asset paths, bundle composition and hash-versioned bundle caching
//! for web servers.
//!
//! The crate turns application-relative references such as `~/Js/app.js`
//! into files served through a pluggable [`FileProvider`], concatenates
//! ordered groups of them into named bundles, and serves a cached,
//! transformed copy until one of the source files changes:
//!
//! - **Resolution**: exact virtual ↔ physical round trips across separators
//!   and case conventions
//! - **Identity**: deterministic XXH3-128 digests per file and per bundle
//! - **Composition**: declaration order, directory expansion, per-kind
//!   transforms
//! - **Caching**: source-hash invalidation with at most one build per bundle
//!
//! ## Quick Start
//!
//! ```ignore
//! use asset_bundle::{AssetPipeline, BundleKind, Config, TransformPipeline};
//!
//! let config = Config::builder("/srv/www").build()?;
//! let assets = AssetPipeline::physical(config, TransformPipeline::new());
//! assets.register("site", BundleKind::Script, &["~/Js/lib", "~/Js/app.js"])?;
//!
//! // In a view: <script src="{url}"></script>
//! let url = assets.url_for("site")?;
//!
//! // In a handler for that URL:
//! let request = assets.parse_request(&url)?;
//! let served = assets.get(&request.name)?;
//! ```
//!
//! ## Modules
//!
//! - [`resource`]: file provider trait and the native / in-memory providers
//! - [`path`]: virtual paths and the resolver
//! - [`hash`]: content digests
//! - [`bundle`]: definitions, transforms and the composer
//! - [`cache`]: the single-flight bundle cache
//! - [`serve`]: the facade used by an HTTP layer
//! - [`config`]: runtime configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bundle;
pub mod cache;
pub mod config;
pub mod error;
pub mod hash;
pub mod path;
pub mod resource;
pub mod serve;

// =============================================================================
// Prelude - import commonly used items with a single `use`
// =============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use asset_bundle::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AssetPipeline, BundleDefinition, BundleError, BundleKind, Config, ConfigBuilder,
        ContentHash, FileProvider, Transform, TransformPipeline, VirtualPath,
    };
}

// =============================================================================
// Serving
// =============================================================================

pub use serve::{AssetPipeline, BundleRequest, ServedBundle};

// =============================================================================
// Building Blocks
// =============================================================================

pub use bundle::{
    normalize_newlines, BundleComposer, BundleDefinition, BundleKind, BundleRegistry,
    ComposedBundle, SourceState, Transform, TransformError, TransformPipeline,
};
#[cfg(feature = "gzip")]
pub use bundle::gzip;
pub use cache::{CacheEntry, CacheStats, CacheStore};
pub use hash::{ContentHash, ContentHasher};
pub use path::{FileDescriptor, PathResolver, VirtualPath};
pub use resource::{FileInfo, FileProvider, MemoryFileProvider, PhysicalFileProvider};

// =============================================================================
// Infrastructure
// =============================================================================

pub use config::{Config, ConfigBuilder};
pub use error::{BundleError, Result};
