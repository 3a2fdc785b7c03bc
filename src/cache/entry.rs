//! Cache entries.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::bundle::ComposedBundle;
use crate::hash::ContentHash;

/// A published bundle and when its sources were last confirmed current.
///
/// Entries are replaced wholesale; revalidation publishes a fresh entry that
/// shares the same artifact.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Bundle name.
    pub key: String,
    /// Hash of the artifact.
    pub current_hash: ContentHash,
    /// The artifact being served.
    pub artifact: Arc<ComposedBundle>,
    /// Wall-clock time of the last validation.
    pub last_validated: DateTime<Utc>,
    /// Monotonic start of the last validation, used for freshness checks.
    pub(crate) validated_at: Instant,
}

impl CacheEntry {
    /// Create an entry for a validation that started at `started`.
    pub(crate) fn new(artifact: Arc<ComposedBundle>, started: Instant) -> Self {
        Self {
            key: artifact.name.clone(),
            current_hash: artifact.hash,
            artifact,
            last_validated: Utc::now(),
            validated_at: started,
        }
    }

    /// A copy of this entry re-stamped after a successful recheck.
    pub(crate) fn revalidated(&self, started: Instant) -> Self {
        Self::new(self.artifact.clone(), started)
    }
}
