//! Bundle definitions and the registry that names them.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{BundleError, Result};
use crate::path::VirtualPath;

// =============================================================================
// BundleKind
// =============================================================================

/// What a bundle contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BundleKind {
    /// JavaScript files.
    Script,
    /// CSS files.
    Style,
}

impl BundleKind {
    /// File extensions (lowercase, no dot) that belong to this kind.
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Script => &["js", "mjs"],
            Self::Style => &["css"],
        }
    }

    /// Extension used in bundle URLs.
    pub const fn url_extension(self) -> &'static str {
        match self {
            Self::Script => "js",
            Self::Style => "css",
        }
    }

    /// MIME type of a served bundle.
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Script => "text/javascript",
            Self::Style => "text/css",
        }
    }

    /// Bytes placed between two concatenated files.
    pub const fn separator(self) -> &'static [u8] {
        match self {
            Self::Script => b";\n",
            Self::Style => b"\n",
        }
    }

    /// Kind for a URL or file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        [Self::Script, Self::Style]
            .into_iter()
            .find(|kind| kind.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    /// Whether a file name carries one of this kind's extensions.
    pub fn matches_file_name(self, name: &str) -> bool {
        match name.rfind('.') {
            Some(idx) if idx > 0 => Self::from_extension(&name[idx + 1..]) == Some(self),
            _ => false,
        }
    }
}

impl fmt::Display for BundleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script => f.write_str("script"),
            Self::Style => f.write_str("style"),
        }
    }
}

// =============================================================================
// BundleDefinition
// =============================================================================

/// A named, ordered list of virtual paths.
///
/// Paths may name files or directories; directories expand to their matching
/// files at composition time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleDefinition {
    name: String,
    kind: BundleKind,
    paths: Vec<VirtualPath>,
}

impl BundleDefinition {
    /// Create and validate a definition.
    pub fn new(
        name: impl Into<String>,
        kind: BundleKind,
        paths: impl IntoIterator<Item = VirtualPath>,
    ) -> Result<Self> {
        let definition = Self {
            name: name.into(),
            kind,
            paths: paths.into_iter().collect(),
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Bundle name, used as cache key and URL segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bundle kind.
    pub fn kind(&self) -> BundleKind {
        self.kind
    }

    /// Paths in declaration order.
    pub fn paths(&self) -> &[VirtualPath] {
        &self.paths
    }

    /// Check structural validity without touching the filesystem.
    ///
    /// Names must be non-empty and usable as a URL segment. A reference whose
    /// extension belongs to the other kind is rejected. Anything else may be a
    /// directory (`~/lib/bootstrap-4.6`), so the file check waits for
    /// [`PathResolver::expand`](crate::path::PathResolver::expand).
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BundleError::invalid_config("bundle name is empty"));
        }
        if let Some(bad) = self
            .name
            .chars()
            .find(|&c| matches!(c, '/' | '\\' | '.' | '?' | '#') || c.is_whitespace())
        {
            return Err(BundleError::invalid_config(format!(
                "bundle name `{}` contains `{bad}`",
                self.name
            )));
        }
        for path in &self.paths {
            if let Some(other) = path.extension().and_then(BundleKind::from_extension)
                && other != self.kind
            {
                return Err(BundleError::invalid_config(format!(
                    "`{path}` is not a {} file (bundle `{}`)",
                    self.kind, self.name
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// BundleRegistry
// =============================================================================

/// Thread-safe set of bundle definitions keyed by name.
///
/// Definitions are immutable; re-registering a name replaces the whole
/// definition.
#[derive(Default)]
pub struct BundleRegistry {
    bundles: RwLock<FxHashMap<String, Arc<BundleDefinition>>>,
}

impl BundleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, returning the one it replaced.
    pub fn register(&self, definition: BundleDefinition) -> Option<Arc<BundleDefinition>> {
        self.bundles
            .write()
            .insert(definition.name.clone(), Arc::new(definition))
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<Arc<BundleDefinition>> {
        self.bundles.read().get(name).cloned()
    }

    /// Remove a definition.
    pub fn remove(&self, name: &str) -> Option<Arc<BundleDefinition>> {
        self.bundles.write().remove(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.bundles.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.bundles.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.bundles.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp(raw: &str) -> VirtualPath {
        VirtualPath::parse(raw, "~/").unwrap()
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(BundleKind::from_extension("JS"), Some(BundleKind::Script));
        assert_eq!(BundleKind::from_extension("css"), Some(BundleKind::Style));
        assert_eq!(BundleKind::from_extension("txt"), None);
    }

    #[test]
    fn test_kind_matches_file_name() {
        assert!(BundleKind::Script.matches_file_name("app.min.js"));
        assert!(!BundleKind::Script.matches_file_name("app.css"));
        assert!(!BundleKind::Style.matches_file_name(".css"));
    }

    #[test]
    fn test_definition_valid() {
        let def = BundleDefinition::new(
            "site",
            BundleKind::Script,
            [vp("~/Js/a.js"), vp("~/Js/lib")],
        )
        .unwrap();
        assert_eq!(def.name(), "site");
        assert_eq!(def.paths().len(), 2);
    }

    #[test]
    fn test_definition_empty_name() {
        let err = BundleDefinition::new(" ", BundleKind::Style, Vec::new()).unwrap_err();
        assert!(matches!(err, BundleError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_definition_name_not_url_safe() {
        assert!(BundleDefinition::new("my.bundle", BundleKind::Style, Vec::new()).is_err());
        assert!(BundleDefinition::new("a/b", BundleKind::Style, Vec::new()).is_err());
    }

    #[test]
    fn test_definition_kind_mismatch() {
        let err =
            BundleDefinition::new("site", BundleKind::Style, [vp("~/Js/a.js")]).unwrap_err();
        assert!(err.to_string().contains("~/Js/a.js"));
    }

    #[test]
    fn test_definition_accepts_dotted_directory() {
        let def = BundleDefinition::new(
            "bs",
            BundleKind::Script,
            [vp("~/lib/bootstrap-4.6"), vp("~/lib/jquery.ui")],
        )
        .unwrap();
        assert_eq!(def.paths().len(), 2);
    }

    #[test]
    fn test_registry_replace() {
        let registry = BundleRegistry::new();
        let first = BundleDefinition::new("site", BundleKind::Script, [vp("~/a.js")]).unwrap();
        let second = BundleDefinition::new("site", BundleKind::Script, [vp("~/b.js")]).unwrap();

        assert!(registry.register(first).is_none());
        let replaced = registry.register(second).unwrap();
        assert_eq!(replaced.paths()[0].as_str(), "~/a.js");
        assert_eq!(registry.get("site").unwrap().paths()[0].as_str(), "~/b.js");
        assert_eq!(registry.names(), ["site"]);
    }
}
