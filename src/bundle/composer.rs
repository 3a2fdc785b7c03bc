//! Bundle composition.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::{debug, info};

use super::artifact::{ComposedBundle, SourceState};
use super::definition::BundleDefinition;
use super::transform::TransformPipeline;
use crate::config::Config;
use crate::error::{BundleError, Result};
use crate::hash::{ContentHasher, ContentHash};
use crate::path::{FileDescriptor, PathResolver};
use crate::resource::FileProvider;

/// UTF-8 byte order mark, dropped from each file before concatenation.
const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Reads, concatenates and transforms the files of a bundle.
///
/// Files are read strictly in declaration order. Any failure aborts the whole
/// composition; no partial artifact is returned.
pub struct BundleComposer {
    resolver: PathResolver,
    hasher: ContentHasher,
    pipeline: TransformPipeline,
    dedupe: bool,
    builds: AtomicU64,
}

impl BundleComposer {
    /// Create a composer over `provider`.
    pub fn new(provider: Arc<dyn FileProvider>, config: &Config, pipeline: TransformPipeline) -> Self {
        Self {
            resolver: PathResolver::new(provider.clone(), config),
            hasher: ContentHasher::new(provider),
            pipeline,
            dedupe: config.dedupe_files,
            builds: AtomicU64::new(0),
        }
    }

    /// The resolver used for every path.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Number of compositions that got past path resolution.
    ///
    /// A bundle with a missing reference fails before it is counted; a read
    /// or transform failure after that point still counts.
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    /// Compose a bundle.
    ///
    /// The bundle hash is computed from the per-file digests, not from the
    /// transformed output, so it tracks source state alone.
    pub fn compose(&self, definition: &BundleDefinition) -> Result<ComposedBundle> {
        definition.validate()?;
        let files = self.collect_files(definition)?;
        self.builds.fetch_add(1, Ordering::Relaxed);

        debug!(
            bundle = definition.name(),
            files = files.len(),
            "composing bundle"
        );

        let kind = definition.kind();
        let mut body = Vec::new();
        let mut source_hashes = Vec::with_capacity(files.len());
        let mut sources = Vec::with_capacity(files.len());

        for (index, file) in files.into_iter().enumerate() {
            let (bytes, hash) = self.hasher.read_and_hash(&file)?;
            if index > 0 {
                body.extend_from_slice(kind.separator());
            }
            body.extend_from_slice(bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes));
            source_hashes.push(hash);
            sources.push(file.virtual_path);
        }

        let bytes = self
            .pipeline
            .apply(kind, body)
            .map_err(|source| BundleError::Composition {
                bundle: definition.name().to_string(),
                source,
            })?;
        let hash = ContentHasher::hash_composite(&source_hashes);

        info!(
            bundle = definition.name(),
            %hash,
            files = sources.len(),
            bytes = bytes.len(),
            "composed bundle"
        );

        Ok(ComposedBundle {
            name: definition.name().to_string(),
            kind,
            hash,
            bytes: bytes.into(),
            source_hashes,
            sources,
        })
    }

    /// Resolve and hash every file of a bundle without composing it.
    pub fn source_state(&self, definition: &BundleDefinition) -> Result<SourceState> {
        let files = self.collect_files(definition)?;
        let hashes = files
            .iter()
            .map(|file| self.hasher.hash_file(file))
            .collect::<Result<Vec<ContentHash>>>()?;
        let sources = files.into_iter().map(|file| file.virtual_path).collect();
        Ok(SourceState { sources, hashes })
    }

    /// Expand every reference in declaration order, optionally dropping repeats.
    fn collect_files(&self, definition: &BundleDefinition) -> Result<Vec<FileDescriptor>> {
        let mut files = Vec::new();
        let mut seen = FxHashSet::default();
        for path in definition.paths() {
            for file in self.resolver.expand(path, definition.kind())? {
                if self.dedupe && !seen.insert(file.virtual_path.clone()) {
                    continue;
                }
                files.push(file);
            }
        }
        Ok(files)
    }
}
