//! Virtual ↔ physical path mapping.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::normalize::{physical_to_slashes, strip_root, to_forward_slashes};
use super::virtual_path::VirtualPath;
use crate::bundle::BundleKind;
use crate::config::Config;
use crate::error::{BundleError, Result};
use crate::resource::{FileInfo, FileProvider};

/// Result of resolving a virtual path.
///
/// Created per call and owned by the caller; the resolver keeps nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// The virtual path that was resolved.
    pub virtual_path: VirtualPath,
    /// Physical location under the web root.
    pub physical_path: PathBuf,
    /// Whether the provider reported the path as existing.
    pub exists: bool,
    /// Whether the path is a directory.
    pub is_directory: bool,
}

/// Maps virtual paths to provider files and back.
///
/// Stateless apart from its configuration, so one resolver can be shared
/// across threads.
#[derive(Clone)]
pub struct PathResolver {
    provider: Arc<dyn FileProvider>,
    virtual_root: String,
    case_insensitive: bool,
}

impl PathResolver {
    /// Create a resolver over `provider`.
    pub fn new(provider: Arc<dyn FileProvider>, config: &Config) -> Self {
        Self {
            provider,
            virtual_root: config.virtual_root.clone(),
            case_insensitive: config.case_insensitive_paths,
        }
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<dyn FileProvider> {
        &self.provider
    }

    /// The virtual root marker.
    pub fn virtual_root(&self) -> &str {
        &self.virtual_root
    }

    /// Parse a raw string into a [`VirtualPath`] under this resolver's root.
    pub fn parse(&self, raw: &str) -> Result<VirtualPath> {
        VirtualPath::parse(raw, &self.virtual_root)
    }

    /// Physical location of `path` under the web root, without an existence check.
    pub fn map_path(&self, path: &VirtualPath) -> PathBuf {
        path.sub_path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.provider.web_root().to_path_buf(), |acc, segment| {
                acc.join(segment)
            })
    }

    /// Resolve a virtual path that must exist.
    ///
    /// Fails with [`BundleError::PathNotFound`] carrying the path as the
    /// caller wrote it when the provider reports nothing there.
    pub fn resolve(&self, path: &VirtualPath) -> Result<FileDescriptor> {
        let descriptor = self.resolve_optional(path);
        if !descriptor.exists {
            return Err(BundleError::PathNotFound {
                path: path.input().to_string(),
            });
        }
        Ok(descriptor)
    }

    /// Resolve a virtual path without requiring it to exist.
    pub fn resolve_optional(&self, path: &VirtualPath) -> FileDescriptor {
        let info = self.provider.file_info(path.sub_path());
        let physical_path = info
            .physical_path
            .unwrap_or_else(|| self.map_path(path));
        FileDescriptor {
            virtual_path: path.clone(),
            physical_path,
            exists: info.exists,
            is_directory: info.is_directory,
        }
    }

    /// Reconstruct the virtual path of a resolved file.
    ///
    /// The result is derived from the descriptor's physical path alone: the
    /// web root is stripped once and separators are normalized. `sub_path`
    /// is only consulted when the descriptor has no physical location.
    pub fn reverse_map(&self, sub_path: &str, file: &FileDescriptor) -> Result<VirtualPath> {
        if file.physical_path.as_os_str().is_empty() {
            return self.parse(&format!(
                "{}{}",
                self.virtual_root,
                to_forward_slashes(sub_path).trim_start_matches('/')
            ));
        }
        self.virtual_from_physical(&file.physical_path)
    }

    /// Derive a virtual path from a physical path under the web root.
    pub fn virtual_from_physical(&self, physical: &Path) -> Result<VirtualPath> {
        let physical_str = physical_to_slashes(physical);
        let root = physical_to_slashes(self.provider.web_root());
        let rest = strip_root(&physical_str, &root, self.case_insensitive).ok_or_else(|| {
            BundleError::invalid_path(physical_str.clone(), "not under the web root")
        })?;
        self.parse(&format!("{}{}", self.virtual_root, rest))
    }

    /// Expand a reference into the files it names.
    ///
    /// A file yields itself and must carry an extension of `kind`. A
    /// directory yields its direct children whose extension belongs to
    /// `kind`, ordered by virtual path.
    pub fn expand(&self, path: &VirtualPath, kind: BundleKind) -> Result<Vec<FileDescriptor>> {
        let descriptor = self.resolve(path)?;
        if !descriptor.is_directory {
            if !kind.matches_file_name(path.file_name()) {
                return Err(BundleError::invalid_config(format!(
                    "`{path}` is not a {kind} file"
                )));
            }
            return Ok(vec![descriptor]);
        }

        let mut files = self
            .provider
            .directory_contents(path.sub_path())
            .into_iter()
            .filter(|info| info.exists && !info.is_directory)
            .filter(|info| kind.matches_file_name(&info.name))
            .map(|info| self.child_descriptor(path, info))
            .collect::<Result<Vec<_>>>()?;
        files.sort_by(|a, b| a.virtual_path.as_str().cmp(b.virtual_path.as_str()));

        debug!(
            directory = %path,
            files = files.len(),
            "expanded directory reference"
        );
        Ok(files)
    }

    fn child_descriptor(&self, parent: &VirtualPath, info: FileInfo) -> Result<FileDescriptor> {
        let (virtual_path, physical_path) = match info.physical_path {
            Some(physical) => (self.virtual_from_physical(&physical)?, physical),
            None => {
                let virtual_path = parent.join(&info.name);
                let physical = self.map_path(&virtual_path);
                (virtual_path, physical)
            }
        };
        Ok(FileDescriptor {
            virtual_path,
            physical_path,
            exists: info.exists,
            is_directory: info.is_directory,
        })
    }
}
