//! Composed bundle artifacts.

use std::sync::Arc;

use super::definition::BundleKind;
use crate::hash::{ContentHash, ContentHasher};
use crate::path::VirtualPath;

/// The output of one composition.
///
/// Immutable once built. A changed source produces a new artifact; this one
/// is never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedBundle {
    /// Bundle name.
    pub name: String,
    /// Bundle kind.
    pub kind: BundleKind,
    /// Composite hash of `source_hashes`.
    pub hash: ContentHash,
    /// Transformed output.
    pub bytes: Arc<[u8]>,
    /// Per-file digests in composition order.
    pub source_hashes: Vec<ContentHash>,
    /// Files that were composed, directory references expanded.
    pub sources: Vec<VirtualPath>,
}

impl ComposedBundle {
    /// The current state of the sources this bundle was built from.
    pub fn source_state(&self) -> SourceState {
        SourceState {
            sources: self.sources.clone(),
            hashes: self.source_hashes.clone(),
        }
    }
}

/// Which files a bundle consists of right now, and their digests.
///
/// Computed cheaply (resolve and hash, no concatenation or transforms) to
/// decide whether a cached artifact is still current.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceState {
    /// Files in composition order.
    pub sources: Vec<VirtualPath>,
    /// Matching digests.
    pub hashes: Vec<ContentHash>,
}

impl SourceState {
    /// The bundle identity this state would produce.
    pub fn composite(&self) -> ContentHash {
        ContentHasher::hash_composite(&self.hashes)
    }

    /// Whether `bundle` was built from exactly this state.
    pub fn matches(&self, bundle: &ComposedBundle) -> bool {
        self.sources == bundle.sources && self.hashes == bundle.source_hashes
    }
}
