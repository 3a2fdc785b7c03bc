//! File provider capability trait.
//!
//! The resolver and hasher never touch the operating system directly; every
//! existence check, directory listing and read goes through a [`FileProvider`].

use std::io;
use std::path::{Path, PathBuf};

// =============================================================================
// FileInfo
// =============================================================================

/// What a provider knows about one path under the web root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Whether anything exists at the path.
    pub exists: bool,
    /// Whether the path is a directory.
    pub is_directory: bool,
    /// Final path component.
    pub name: String,
    /// Absolute physical location, when the provider has one.
    pub physical_path: Option<PathBuf>,
}

impl FileInfo {
    /// Info for a path that does not exist.
    pub fn missing(name: impl Into<String>, physical_path: Option<PathBuf>) -> Self {
        Self {
            exists: false,
            is_directory: false,
            name: name.into(),
            physical_path,
        }
    }
}

// =============================================================================
// FileProvider Trait
// =============================================================================

/// Source of filesystem truth for a web root.
///
/// Sub paths handed to a provider are relative to the web root, use `/` as
/// separator and carry no leading slash (e.g. `Js/app.js`).
///
/// # Example
///
/// ```ignore
/// use asset_bundle::{FileProvider, MemoryFileProvider};
///
/// let provider = MemoryFileProvider::new("/srv/www");
/// provider.insert("Js/app.js", "console.log(1)");
/// assert!(provider.file_info("Js/app.js").exists);
/// ```
pub trait FileProvider: Send + Sync {
    /// The physical directory this provider serves.
    fn web_root(&self) -> &Path;

    /// Look up a sub path.
    ///
    /// Always returns an info value; `exists` is `false` for missing paths.
    fn file_info(&self, sub_path: &str) -> FileInfo;

    /// List the direct children of a directory sub path.
    ///
    /// Returns an empty list for missing paths and for files.
    fn directory_contents(&self, sub_path: &str) -> Vec<FileInfo>;

    /// Read the bytes at a physical path previously reported by this provider.
    fn read(&self, physical_path: &Path) -> io::Result<Vec<u8>>;
}
