//! Bundle definitions, composition and transforms.
//!
//! ```text
//! BundleDefinition { name, kind, paths }
//!        │
//!        ▼  for each path, in order
//! PathResolver::expand ──► FileDescriptor ──► ContentHasher::read_and_hash
//!        │                                          │
//!        ▼                                          ▼
//!   concatenated bytes                       per-file ContentHash
//!        │                                          │
//!        ▼ TransformPipeline (per kind)             ▼ hash_composite
//!   ComposedBundle { bytes, hash, source_hashes, sources }
//! ```

mod artifact;
mod composer;
mod definition;
mod transform;

pub use artifact::{ComposedBundle, SourceState};
pub use composer::BundleComposer;
pub use definition::{BundleDefinition, BundleKind, BundleRegistry};
#[cfg(feature = "gzip")]
pub use transform::gzip;
pub use transform::{normalize_newlines, Transform, TransformError, TransformPipeline};
