//! Configuration for asset resolution and bundle caching.
//!
//! Use [`ConfigBuilder`] when constructing an [`AssetPipeline`](crate::AssetPipeline)
//! to set the web root, the virtual root marker, and cache behavior.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BundleError, Result};

/// Default marker that roots every virtual path.
pub const DEFAULT_VIRTUAL_ROOT: &str = "~/";

/// Default URL prefix under which bundles are served.
pub const DEFAULT_URL_PREFIX: &str = "/sb";

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Physical directory that virtual paths are resolved against.
    pub web_root: PathBuf,
    /// Prefix identifying application-relative paths. Example: "~/"
    pub virtual_root: String,
    /// URL path prefix for bundle URLs. Example: "/sb"
    pub url_prefix: String,
    /// How long a validated cache entry is served without rechecking sources.
    ///
    /// Zero means every lookup rechecks source hashes.
    pub revalidate_interval: Duration,
    /// Skip repeated occurrences of a file within one bundle.
    pub dedupe_files: bool,
    /// Compare web-root prefixes ignoring ASCII case.
    pub case_insensitive_paths: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_root: PathBuf::new(),
            virtual_root: DEFAULT_VIRTUAL_ROOT.to_string(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
            revalidate_interval: Duration::ZERO,
            dedupe_files: false,
            case_insensitive_paths: cfg!(windows),
        }
    }
}

impl Config {
    /// Shorthand for [`ConfigBuilder::new`] with the given web root.
    pub fn builder(web_root: impl Into<PathBuf>) -> ConfigBuilder {
        ConfigBuilder::new().web_root(web_root)
    }

    /// The configured web root.
    pub fn web_root(&self) -> &Path {
        &self.web_root
    }
}

/// Configuration builder for fluent API.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    web_root: Option<PathBuf>,
    virtual_root: Option<String>,
    url_prefix: Option<String>,
    revalidate_interval: Option<Duration>,
    dedupe_files: Option<bool>,
    case_insensitive_paths: Option<bool>,
}

impl ConfigBuilder {
    /// Create a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the physical web root.
    pub fn web_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.web_root = Some(root.into());
        self
    }

    /// Set the virtual root marker.
    ///
    /// Default: "~/"
    ///
    /// # Example
    ///
    /// ```
    /// use asset_bundle::config::ConfigBuilder;
    ///
    /// let config = ConfigBuilder::new()
    ///     .web_root("/srv/www")
    ///     .virtual_root("~/")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.virtual_root, "~/");
    /// ```
    pub fn virtual_root(mut self, marker: impl Into<String>) -> Self {
        self.virtual_root = Some(marker.into());
        self
    }

    /// Set the URL prefix for bundle URLs.
    ///
    /// Default: "/sb"
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = Some(prefix.into());
        self
    }

    /// Set how long a validated entry is trusted before rechecking sources.
    pub fn revalidate_interval(mut self, interval: Duration) -> Self {
        self.revalidate_interval = Some(interval);
        self
    }

    /// Skip repeated files within a bundle (first occurrence wins).
    pub fn dedupe_files(mut self, dedupe: bool) -> Self {
        self.dedupe_files = Some(dedupe);
        self
    }

    /// Compare physical path prefixes ignoring ASCII case.
    ///
    /// Default: `true` on Windows, `false` elsewhere.
    pub fn case_insensitive_paths(mut self, insensitive: bool) -> Self {
        self.case_insensitive_paths = Some(insensitive);
        self
    }

    /// Validate and build the configuration.
    ///
    /// The web root is required. A relative web root is anchored at the
    /// current working directory.
    pub fn build(self) -> Result<Config> {
        let defaults = Config::default();
        let mut config = Config {
            web_root: self.web_root.unwrap_or(defaults.web_root),
            virtual_root: self.virtual_root.unwrap_or(defaults.virtual_root),
            url_prefix: self.url_prefix.unwrap_or(defaults.url_prefix),
            revalidate_interval: self
                .revalidate_interval
                .unwrap_or(defaults.revalidate_interval),
            dedupe_files: self.dedupe_files.unwrap_or(defaults.dedupe_files),
            case_insensitive_paths: self
                .case_insensitive_paths
                .unwrap_or(defaults.case_insensitive_paths),
        };

        if config.web_root.as_os_str().is_empty() {
            return Err(BundleError::invalid_config("web root is not set"));
        }
        if !config.web_root.has_root() {
            let cwd = std::env::current_dir().map_err(|e| {
                BundleError::invalid_config(format!(
                    "cannot anchor relative web root `{}`: {e}",
                    config.web_root.display()
                ))
            })?;
            config.web_root = cwd.join(&config.web_root);
        }
        if config.virtual_root.is_empty() || !config.virtual_root.ends_with('/') {
            return Err(BundleError::invalid_config(format!(
                "virtual root `{}` must be non-empty and end with `/`",
                config.virtual_root
            )));
        }
        if config.virtual_root.contains('\\') {
            return Err(BundleError::invalid_config(
                "virtual root must use forward slashes",
            ));
        }
        if !config.url_prefix.starts_with('/') || config.url_prefix.ends_with('/') {
            return Err(BundleError::invalid_config(format!(
                "url prefix `{}` must start with `/` and not end with one",
                config.url_prefix
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.virtual_root, "~/");
        assert_eq!(config.url_prefix, "/sb");
        assert_eq!(config.revalidate_interval, Duration::ZERO);
        assert!(!config.dedupe_files);
    }

    #[test]
    fn test_builder() {
        let config = Config::builder("/srv/www")
            .url_prefix("/bundles")
            .dedupe_files(true)
            .build()
            .unwrap();
        assert_eq!(config.web_root(), Path::new("/srv/www"));
        assert_eq!(config.url_prefix, "/bundles");
        assert!(config.dedupe_files);
    }

    #[test]
    fn test_builder_rejects_bad_marker() {
        let err = Config::builder("/srv/www")
            .virtual_root("~")
            .build()
            .unwrap_err();
        assert!(matches!(err, BundleError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_builder_rejects_trailing_slash_prefix() {
        assert!(Config::builder("/srv/www").url_prefix("/sb/").build().is_err());
        assert!(Config::builder("/srv/www").url_prefix("sb").build().is_err());
    }

    #[test]
    fn test_builder_requires_web_root() {
        let err = ConfigBuilder::new().build().unwrap_err();
        assert!(matches!(err, BundleError::InvalidConfiguration { .. }));
        assert!(Config::builder("").build().is_err());
    }

    #[test]
    fn test_builder_anchors_relative_web_root() {
        let config = Config::builder("wwwroot").build().unwrap();
        assert!(config.web_root().has_root());
        assert!(config.web_root().ends_with("wwwroot"));
    }
}
