//! In-memory file provider.
//!
//! Useful for tests and for hosts that keep assets in memory. Files can be
//! inserted, replaced and removed through a shared reference, so a cache
//! holding the provider observes edits immediately.

use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use super::provider::{FileInfo, FileProvider};
use crate::path::to_forward_slashes;

/// A simple map-based file provider.
///
/// # Example
///
/// ```ignore
/// use asset_bundle::MemoryFileProvider;
///
/// let provider = MemoryFileProvider::new("/srv/www");
/// provider.insert("Js/site.js", "var site = {};");
/// provider.insert("Css/site.css", "body { margin: 0 }");
/// ```
#[derive(Default)]
pub struct MemoryFileProvider {
    root: PathBuf,
    files: RwLock<FxHashMap<String, Vec<u8>>>,
    unreadable: RwLock<FxHashSet<String>>,
}

impl MemoryFileProvider {
    /// Create an empty provider whose physical paths live under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Insert or replace a file with string content.
    pub fn insert(&self, sub_path: &str, content: impl AsRef<str>) {
        self.insert_bytes(sub_path, content.as_ref().as_bytes().to_vec());
    }

    /// Insert or replace a file with binary content.
    pub fn insert_bytes(&self, sub_path: &str, content: impl Into<Vec<u8>>) {
        self.files.write().insert(normalize_key(sub_path), content.into());
    }

    /// Remove a file.
    pub fn remove(&self, sub_path: &str) -> Option<Vec<u8>> {
        self.files.write().remove(&normalize_key(sub_path))
    }

    /// Make reads of an existing file fail with `PermissionDenied`.
    pub fn deny_read(&self, sub_path: &str) {
        self.unreadable.write().insert(normalize_key(sub_path));
    }

    /// Check if a file exists.
    pub fn contains(&self, sub_path: &str) -> bool {
        self.files.read().contains_key(&normalize_key(sub_path))
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    fn physical(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    fn is_dir_key(&self, key: &str) -> bool {
        let prefix = dir_prefix(key);
        self.files.read().keys().any(|k| k.starts_with(&prefix))
    }
}

impl FileProvider for MemoryFileProvider {
    fn web_root(&self) -> &Path {
        &self.root
    }

    fn file_info(&self, sub_path: &str) -> FileInfo {
        let key = normalize_key(sub_path);
        let name = key.rsplit('/').next().unwrap_or_default().to_string();
        let physical_path = Some(self.physical(&key));

        if self.files.read().contains_key(&key) {
            FileInfo {
                exists: true,
                is_directory: false,
                name,
                physical_path,
            }
        } else if self.is_dir_key(&key) {
            FileInfo {
                exists: true,
                is_directory: true,
                name,
                physical_path,
            }
        } else {
            FileInfo::missing(name, physical_path)
        }
    }

    fn directory_contents(&self, sub_path: &str) -> Vec<FileInfo> {
        let key = normalize_key(sub_path);
        let prefix = dir_prefix(&key);

        let mut children: Vec<String> = self
            .files
            .read()
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .map(|rest| rest.split('/').next().unwrap_or(rest).to_string())
            .collect();
        children.sort();
        children.dedup();

        children
            .into_iter()
            .map(|child| self.file_info(&format!("{prefix}{child}")))
            .collect()
    }

    fn read(&self, physical_path: &Path) -> io::Result<Vec<u8>> {
        let key = physical_path
            .strip_prefix(&self.root)
            .map(|rel| normalize_key(&rel.to_string_lossy()))
            .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "outside web root"))?;

        if self.unreadable.read().contains(&key) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read denied",
            ));
        }
        self.files
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

fn normalize_key(sub_path: &str) -> String {
    to_forward_slashes(sub_path).trim_matches('/').to_string()
}

fn dir_prefix(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!("{key}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_info() {
        let provider = MemoryFileProvider::new("/srv/www");
        provider.insert("Js/app.js", "var a;");

        let info = provider.file_info("Js/app.js");
        assert!(info.exists);
        assert!(!info.is_directory);
        assert_eq!(info.name, "app.js");
        assert_eq!(
            info.physical_path,
            Some(Path::new("/srv/www").join("Js").join("app.js"))
        );
    }

    #[test]
    fn test_backslash_keys() {
        let provider = MemoryFileProvider::new("/srv/www");
        provider.insert("Js\\app.js", "var a;");
        assert!(provider.contains("Js/app.js"));
    }

    #[test]
    fn test_directory_detection() {
        let provider = MemoryFileProvider::new("/srv/www");
        provider.insert("Js/lib/a.js", "a");
        provider.insert("Js/b.js", "b");

        assert!(provider.file_info("Js").is_directory);
        let names: Vec<_> = provider
            .directory_contents("Js")
            .into_iter()
            .map(|info| (info.name, info.is_directory))
            .collect();
        assert_eq!(
            names,
            [("b.js".to_string(), false), ("lib".to_string(), true)]
        );
    }

    #[test]
    fn test_read_round_trip_through_physical_path() {
        let provider = MemoryFileProvider::new("/srv/www");
        provider.insert("Css/site.css", "body{}");

        let physical = provider.file_info("Css/site.css").physical_path.unwrap();
        assert_eq!(provider.read(&physical).unwrap(), b"body{}");
    }

    #[test]
    fn test_deny_read() {
        let provider = MemoryFileProvider::new("/srv/www");
        provider.insert("Js/app.js", "var a;");
        provider.deny_read("Js/app.js");

        let physical = provider.file_info("Js/app.js").physical_path.unwrap();
        let err = provider.read(&physical).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_remove() {
        let provider = MemoryFileProvider::new("/srv/www");
        provider.insert("a.js", "a");
        assert_eq!(provider.len(), 1);
        provider.remove("a.js");
        assert!(provider.is_empty());
        assert!(!provider.file_info("a.js").exists);
    }
}
