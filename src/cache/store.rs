//! Single-flight bundle cache.
//!
//! # Per-key state
//!
//! ```text
//! Absent ──get──► Building ──ok──► Valid ──get, sources match──► Valid
//!                    ▲                │
//!                    └──── Stale ◄────┘ get, sources changed
//! ```
//!
//! Each bundle name owns a [`KeySlot`]: the published entry behind an
//! `RwLock`, and a build gate (`Mutex<()>`). Every transition out of `Valid`
//! happens while holding the gate, so one key never has two compositions in
//! flight. Callers that queue on the gate reuse whatever the holder
//! published if its validation began after they asked.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use super::entry::CacheEntry;
use crate::bundle::{BundleComposer, BundleDefinition, BundleRegistry, ComposedBundle};
use crate::error::{BundleError, Result};

// =============================================================================
// Statistics
// =============================================================================

/// Counters describing cache behavior since creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered without touching sources.
    pub hits: u64,
    /// Lookups that rechecked sources and found them unchanged.
    pub revalidations: u64,
    /// Successful compositions.
    pub builds: u64,
    /// Entries replaced because a source changed.
    pub stale: u64,
    /// Failed compositions or rechecks.
    pub failures: u64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    revalidations: AtomicU64,
    builds: AtomicU64,
    stale: AtomicU64,
    failures: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            revalidations: self.revalidations.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            stale: self.stale.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

// =============================================================================
// KeySlot
// =============================================================================

#[derive(Default)]
struct KeySlot {
    entry: RwLock<Option<Arc<CacheEntry>>>,
    gate: Mutex<()>,
}

impl KeySlot {
    fn current(&self) -> Option<Arc<CacheEntry>> {
        self.entry.read().clone()
    }

    fn publish(&self, entry: CacheEntry) -> Arc<CacheEntry> {
        let entry = Arc::new(entry);
        *self.entry.write() = Some(entry.clone());
        entry
    }
}

// =============================================================================
// CacheStore
// =============================================================================

/// Keyed store of composed bundles.
///
/// Bundles are independent: a build of one never blocks lookups of another.
pub struct CacheStore {
    composer: BundleComposer,
    registry: Arc<BundleRegistry>,
    slots: RwLock<FxHashMap<String, Arc<KeySlot>>>,
    revalidate_interval: Duration,
    counters: Counters,
}

impl CacheStore {
    /// Create a store building bundles from `registry` with `composer`.
    pub fn new(
        composer: BundleComposer,
        registry: Arc<BundleRegistry>,
        revalidate_interval: Duration,
    ) -> Self {
        Self {
            composer,
            registry,
            slots: RwLock::new(FxHashMap::default()),
            revalidate_interval,
            counters: Counters::default(),
        }
    }

    /// The composer used for builds.
    pub fn composer(&self) -> &BundleComposer {
        &self.composer
    }

    /// The registry bundles are looked up in.
    pub fn registry(&self) -> &Arc<BundleRegistry> {
        &self.registry
    }

    /// Get the current artifact for a bundle, building or rebuilding as needed.
    pub fn get(&self, name: &str) -> Result<Arc<ComposedBundle>> {
        let requested = Instant::now();
        let definition = self
            .registry
            .get(name)
            .ok_or_else(|| BundleError::BundleNotFound {
                name: name.to_string(),
            })?;
        let slot = self.slot(name);

        if let Some(entry) = slot.current()
            && self.is_fresh(&entry, requested)
        {
            Counters::bump(&self.counters.hits);
            return Ok(entry.artifact.clone());
        }

        let _gate = slot.gate.lock();

        // Someone else may have finished while we waited.
        let previous = slot.current();
        if let Some(entry) = &previous
            && self.is_fresh(entry, requested)
        {
            Counters::bump(&self.counters.hits);
            debug!(bundle = name, hash = %entry.current_hash, "coalesced onto fresh entry");
            return Ok(entry.artifact.clone());
        }

        let started = Instant::now();
        let result = match previous {
            Some(entry) => self.revalidate(&slot, &definition, &entry, started),
            None => self.build(&slot, &definition, started),
        };
        if let Err(e) = &result {
            Counters::bump(&self.counters.failures);
            warn!(bundle = name, error = %e, "bundle unavailable");
        }
        result
    }

    /// Drop the cached entry for a bundle; the next lookup rebuilds it.
    ///
    /// Waits for an in-flight build of the same bundle to finish first.
    pub fn invalidate(&self, name: &str) -> bool {
        let Some(slot) = self.slots.read().get(name).cloned() else {
            return false;
        };
        let _gate = slot.gate.lock();
        slot.entry.write().take().is_some()
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        let slots: Vec<_> = self.slots.read().values().cloned().collect();
        for slot in slots {
            let _gate = slot.gate.lock();
            slot.entry.write().take();
        }
    }

    /// The published entry for a bundle, without validating it.
    pub fn entry(&self, name: &str) -> Option<Arc<CacheEntry>> {
        self.slots.read().get(name).and_then(|slot| slot.current())
    }

    /// Number of bundles with a published entry.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.entry.read().is_some())
            .count()
    }

    /// Check if no bundle is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counters since creation.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Build or validate every registered bundle in parallel.
    ///
    /// Results are returned in name order.
    #[cfg(feature = "batch")]
    pub fn warm_all(&self) -> Vec<(String, Result<Arc<ComposedBundle>>)> {
        use rayon::prelude::*;

        self.registry
            .names()
            .into_par_iter()
            .map(|name| {
                let result = self.get(&name);
                (name, result)
            })
            .collect()
    }

    /// Build or validate every registered bundle.
    ///
    /// Results are returned in name order.
    #[cfg(not(feature = "batch"))]
    pub fn warm_all(&self) -> Vec<(String, Result<Arc<ComposedBundle>>)> {
        self.registry
            .names()
            .into_iter()
            .map(|name| {
                let result = self.get(&name);
                (name, result)
            })
            .collect()
    }

    fn slot(&self, name: &str) -> Arc<KeySlot> {
        if let Some(slot) = self.slots.read().get(name) {
            return slot.clone();
        }
        self.slots
            .write()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn is_fresh(&self, entry: &CacheEntry, requested: Instant) -> bool {
        entry.validated_at > requested || entry.validated_at.elapsed() < self.revalidate_interval
    }

    fn revalidate(
        &self,
        slot: &KeySlot,
        definition: &BundleDefinition,
        entry: &CacheEntry,
        started: Instant,
    ) -> Result<Arc<ComposedBundle>> {
        let state = self.composer.source_state(definition)?;
        if entry.artifact.kind == definition.kind() && state.matches(&entry.artifact) {
            Counters::bump(&self.counters.revalidations);
            let entry = slot.publish(entry.revalidated(started));
            return Ok(entry.artifact.clone());
        }

        Counters::bump(&self.counters.stale);
        info!(
            bundle = definition.name(),
            previous = %entry.current_hash,
            "sources changed, rebuilding bundle"
        );
        self.build(slot, definition, started)
    }

    fn build(
        &self,
        slot: &KeySlot,
        definition: &BundleDefinition,
        started: Instant,
    ) -> Result<Arc<ComposedBundle>> {
        let artifact = Arc::new(self.composer.compose(definition)?);
        Counters::bump(&self.counters.builds);
        slot.publish(CacheEntry::new(artifact.clone(), started));
        Ok(artifact)
    }
}
