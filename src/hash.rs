//! Content hashing for cache identity and cache-busting URLs.
//!
//! File digests are XXH3-128 over the raw bytes. Bundle digests fold an
//! ordered list of file digests, length-prefixed so that neither order nor
//! boundaries can be confused.

use std::fmt;
use std::sync::Arc;

use xxhash_rust::xxh3::{xxh3_128, Xxh3};

use crate::error::{BundleError, Result};
use crate::path::FileDescriptor;
use crate::resource::FileProvider;

/// Domain tag mixed into composite digests so they never equal a file digest.
const COMPOSITE_TAG: &[u8] = b"asset-bundle/composite/v1";

// =============================================================================
// ContentHash
// =============================================================================

/// A 128-bit content digest.
///
/// Identical bytes always produce identical hashes; no salt, clock or
/// machine state is involved.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Wrap raw digest bytes.
    pub const fn from_raw(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// The raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Lowercase hex rendering, 32 characters.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

// =============================================================================
// ContentHasher
// =============================================================================

/// Computes file and composite digests, reading through a [`FileProvider`].
#[derive(Clone)]
pub struct ContentHasher {
    provider: Arc<dyn FileProvider>,
}

impl ContentHasher {
    /// Create a hasher reading through `provider`.
    pub fn new(provider: Arc<dyn FileProvider>) -> Self {
        Self { provider }
    }

    /// Digest of a byte slice.
    pub fn hash_bytes(data: &[u8]) -> ContentHash {
        ContentHash(xxh3_128(data).to_le_bytes())
    }

    /// Read a resolved file and return its bytes together with their digest.
    ///
    /// Read failures are [`BundleError::Io`]; existence is the resolver's job.
    pub fn read_and_hash(&self, file: &FileDescriptor) -> Result<(Vec<u8>, ContentHash)> {
        let bytes = self
            .provider
            .read(&file.physical_path)
            .map_err(|source| BundleError::Io {
                path: file.physical_path.clone(),
                source,
            })?;
        let hash = Self::hash_bytes(&bytes);
        Ok((bytes, hash))
    }

    /// Digest of a resolved file's current content.
    pub fn hash_file(&self, file: &FileDescriptor) -> Result<ContentHash> {
        self.read_and_hash(file).map(|(_, hash)| hash)
    }

    /// Fold an ordered sequence of digests into one.
    ///
    /// Order-sensitive, and well-defined for the empty sequence.
    pub fn hash_composite(hashes: &[ContentHash]) -> ContentHash {
        Self::hash_parts(hashes.iter().map(|h| h.as_bytes().as_slice()))
    }

    /// Fold arbitrary byte parts, each length-prefixed.
    ///
    /// `["ab", "c"]` and `["a", "bc"]` produce different digests.
    pub fn hash_parts<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> ContentHash {
        let mut state = Xxh3::new();
        state.update(COMPOSITE_TAG);
        let mut count: u64 = 0;
        for part in parts {
            state.update(&(part.len() as u64).to_le_bytes());
            state.update(part);
            count += 1;
        }
        state.update(&count.to_le_bytes());
        ContentHash(state.digest128().to_le_bytes())
    }
}
