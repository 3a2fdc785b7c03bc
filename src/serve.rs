//! Serving facade: bundle bytes, hashes and cache-busting URLs.
//!
//! Bundle URLs embed the current hash so clients refetch whenever a source
//! changes:
//!
//! ```text
//! /sb/site.js.v3f0c9a...e1
//! └┬┘ └┬─┘ └┘ └────┬─────┘
//! prefix name ext  version (ContentHash hex)
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::bundle::{BundleComposer, BundleDefinition, BundleKind, BundleRegistry, TransformPipeline};
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{BundleError, Result};
use crate::hash::ContentHash;
use crate::path::PathResolver;
use crate::resource::{FileProvider, PhysicalFileProvider};

/// What a caller needs to write a bundle into a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedBundle {
    /// Transformed bundle bytes.
    pub bytes: Arc<[u8]>,
    /// Bundle identity, also the URL version segment.
    pub hash: ContentHash,
    /// Bundle kind.
    pub kind: BundleKind,
    /// MIME type for the response.
    pub content_type: &'static str,
}

/// A parsed bundle URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    /// Bundle name.
    pub name: String,
    /// Kind implied by the URL extension.
    pub kind: BundleKind,
    /// Requested version (hash hex), if the URL carried one.
    pub version: Option<String>,
}

/// Resolver, registry and cache wired together.
///
/// # Example
///
/// ```ignore
/// use asset_bundle::{AssetPipeline, BundleKind, Config, TransformPipeline};
///
/// let config = Config::builder("/srv/www").build()?;
/// let pipeline = AssetPipeline::physical(config, TransformPipeline::new());
/// pipeline.register("site", BundleKind::Script, &["~/Js/jquery.js", "~/Js/app"])?;
///
/// let url = pipeline.url_for("site")?;      // "/sb/site.js.v…"
/// let served = pipeline.get("site")?;       // bytes + hash
/// ```
pub struct AssetPipeline {
    config: Config,
    store: CacheStore,
}

impl AssetPipeline {
    /// Create a pipeline over any provider.
    pub fn new(config: Config, provider: Arc<dyn FileProvider>, transforms: TransformPipeline) -> Self {
        let composer = BundleComposer::new(provider, &config, transforms);
        let store = CacheStore::new(
            composer,
            Arc::new(BundleRegistry::new()),
            config.revalidate_interval,
        );
        Self { config, store }
    }

    /// Create a pipeline over the native filesystem at `config.web_root`.
    pub fn physical(config: Config, transforms: TransformPipeline) -> Self {
        let provider = Arc::new(PhysicalFileProvider::new(config.web_root.clone()));
        Self::new(config, provider, transforms)
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path resolver.
    pub fn resolver(&self) -> &PathResolver {
        self.store.composer().resolver()
    }

    /// Bundle registry.
    pub fn registry(&self) -> &Arc<BundleRegistry> {
        self.store.registry()
    }

    /// Underlying cache.
    pub fn cache(&self) -> &CacheStore {
        &self.store
    }

    /// Parse `paths` and register a bundle, replacing any previous definition.
    pub fn register(&self, name: &str, kind: BundleKind, paths: &[&str]) -> Result<()> {
        let paths = paths
            .iter()
            .map(|raw| self.resolver().parse(raw))
            .collect::<Result<Vec<_>>>()?;
        let definition = BundleDefinition::new(name, kind, paths)?;
        if self.registry().register(definition).is_some() {
            self.store.invalidate(name);
        }
        Ok(())
    }

    /// Current bytes and hash of a bundle.
    pub fn get(&self, name: &str) -> Result<ServedBundle> {
        let bundle = self.store.get(name)?;
        Ok(ServedBundle {
            bytes: bundle.bytes.clone(),
            hash: bundle.hash,
            kind: bundle.kind,
            content_type: bundle.kind.content_type(),
        })
    }

    /// Cache-busting URL for a bundle, built from its current hash.
    pub fn url_for(&self, name: &str) -> Result<String> {
        let bundle = self.store.get(name)?;
        Ok(format!(
            "{}/{}.{}.v{}",
            self.config.url_prefix,
            bundle.name,
            bundle.kind.url_extension(),
            bundle.hash
        ))
    }

    /// Parse a request path produced by [`url_for`](Self::url_for).
    ///
    /// The version segment is optional so unversioned URLs still route.
    pub fn parse_request(&self, path: &str) -> Result<BundleRequest> {
        let invalid = |reason: &str| BundleError::invalid_path(path, reason);

        let rest = path
            .strip_prefix(self.config.url_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| invalid("not under the bundle url prefix"))?;
        if rest.contains('/') {
            return Err(invalid("nested bundle paths are not supported"));
        }

        let (file, version) = match rest.rsplit_once('.') {
            Some((file, tag)) if is_version_tag(tag) => (file, Some(tag[1..].to_string())),
            _ => (rest, None),
        };
        let (name, ext) = file
            .rsplit_once('.')
            .ok_or_else(|| invalid("missing bundle extension"))?;
        if name.is_empty() {
            return Err(invalid("empty bundle name"));
        }
        let kind = BundleKind::from_extension(ext).ok_or_else(|| invalid("unknown bundle extension"))?;

        debug!(bundle = name, %kind, ?version, "parsed bundle request");
        Ok(BundleRequest {
            name: name.to_string(),
            kind,
            version,
        })
    }

    /// Whether a request names the bundle's current version.
    ///
    /// Unversioned requests always count as current.
    pub fn is_current(&self, request: &BundleRequest) -> Result<bool> {
        let bundle = self.store.get(&request.name)?;
        if bundle.kind != request.kind {
            return Err(BundleError::BundleNotFound {
                name: format!("{}.{}", request.name, request.kind.url_extension()),
            });
        }
        Ok(request
            .version
            .as_deref()
            .is_none_or(|version| version == bundle.hash.to_hex()))
    }
}

fn is_version_tag(tag: &str) -> bool {
    tag.len() > 1 && tag.starts_with('v') && tag[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::MemoryFileProvider;

    fn pipeline() -> (Arc<MemoryFileProvider>, AssetPipeline) {
        let provider = Arc::new(MemoryFileProvider::new("/srv/www"));
        provider.insert("Js/a.js", "var a");
        provider.insert("Css/site.css", "body{}");
        let config = Config::builder("/srv/www").build().unwrap();
        let pipeline = AssetPipeline::new(config, provider.clone(), TransformPipeline::new());
        pipeline
            .register("app", BundleKind::Script, &["~/Js/a.js"])
            .unwrap();
        pipeline
            .register("theme", BundleKind::Style, &["~/Css"])
            .unwrap();
        (provider, pipeline)
    }

    #[test]
    fn test_get_serves_bytes_and_content_type() {
        let (_, pipeline) = pipeline();
        let served = pipeline.get("theme").unwrap();

        assert_eq!(&*served.bytes, b"body{}");
        assert_eq!(served.content_type, "text/css");
    }

    #[test]
    fn test_url_round_trip() {
        let (_, pipeline) = pipeline();
        let url = pipeline.url_for("app").unwrap();
        let hash = pipeline.get("app").unwrap().hash;

        assert_eq!(url, format!("/sb/app.js.v{hash}"));
        let request = pipeline.parse_request(&url).unwrap();
        assert_eq!(request.name, "app");
        assert_eq!(request.kind, BundleKind::Script);
        assert!(pipeline.is_current(&request).unwrap());
    }

    #[test]
    fn test_url_changes_after_edit() {
        let (provider, pipeline) = pipeline();
        let before = pipeline.url_for("app").unwrap();

        provider.insert("Js/a.js", "var a = 2");
        let old_request = pipeline.parse_request(&before).unwrap();
        assert!(!pipeline.is_current(&old_request).unwrap());
        assert_ne!(pipeline.url_for("app").unwrap(), before);
    }

    #[test]
    fn test_parse_unversioned() {
        let (_, pipeline) = pipeline();
        let request = pipeline.parse_request("/sb/theme.css").unwrap();
        assert_eq!(request.version, None);
        assert!(pipeline.is_current(&request).unwrap());
    }

    #[test]
    fn test_parse_rejects_bad_paths() {
        let (_, pipeline) = pipeline();
        for path in ["/other/app.js", "/sb/app", "/sb/a/b.js", "/sb/.js", "/sb/app.txt"] {
            let err = pipeline.parse_request(path).unwrap_err();
            assert!(matches!(err, BundleError::InvalidPath { .. }), "{path}");
        }
    }

    #[test]
    fn test_is_current_kind_mismatch() {
        let (_, pipeline) = pipeline();
        let request = pipeline.parse_request("/sb/app.css").unwrap();
        assert!(pipeline.is_current(&request).unwrap_err().is_not_found());
    }

    #[test]
    fn test_register_rejects_bad_virtual_path() {
        let (_, pipeline) = pipeline();
        let err = pipeline
            .register("bad", BundleKind::Script, &["Js/a.js"])
            .unwrap_err();
        assert!(matches!(err, BundleError::InvalidPath { .. }));
    }

    #[test]
    fn test_physical_pipeline_tracks_disk_edits() {
        use std::fs;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("Js")).unwrap();
        fs::write(dir.path().join("Js/a.js"), "var a").unwrap();
        fs::write(dir.path().join("Js/b.js"), "var b").unwrap();

        let config = Config::builder(dir.path()).build().unwrap();
        let pipeline = AssetPipeline::physical(config, TransformPipeline::new());
        pipeline.register("site", BundleKind::Script, &["~/Js"]).unwrap();

        let first = pipeline.get("site").unwrap();
        assert_eq!(&*first.bytes, b"var a;\nvar b");

        fs::write(dir.path().join("Js/b.js"), "var b = 2").unwrap();
        let second = pipeline.get("site").unwrap();
        assert_eq!(&*second.bytes, b"var a;\nvar b = 2");
        assert_ne!(first.hash, second.hash);
    }

    #[test]
    fn test_reregister_invalidates() {
        let (provider, pipeline) = pipeline();
        provider.insert("Js/b.js", "var b");
        pipeline.get("app").unwrap();

        pipeline
            .register("app", BundleKind::Script, &["~/Js/b.js"])
            .unwrap();
        assert!(pipeline.cache().entry("app").is_none());
        assert_eq!(&*pipeline.get("app").unwrap().bytes, b"var b");
    }
}
