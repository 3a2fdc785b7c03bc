//! Native filesystem provider.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::provider::{FileInfo, FileProvider};

/// Provider backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct PhysicalFileProvider {
    root: PathBuf,
}

impl PhysicalFileProvider {
    /// Create a provider serving `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn join(&self, sub_path: &str) -> PathBuf {
        sub_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

impl FileProvider for PhysicalFileProvider {
    fn web_root(&self) -> &Path {
        &self.root
    }

    fn file_info(&self, sub_path: &str) -> FileInfo {
        let path = self.join(sub_path);
        info_for(path)
    }

    fn directory_contents(&self, sub_path: &str) -> Vec<FileInfo> {
        let Ok(entries) = fs::read_dir(self.join(sub_path)) else {
            return Vec::new();
        };
        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| info_for(entry.path()))
            .collect()
    }

    fn read(&self, physical_path: &Path) -> io::Result<Vec<u8>> {
        let meta = fs::metadata(physical_path)?;
        if meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path is a directory",
            ));
        }
        fs::read(physical_path)
    }
}

fn info_for(path: PathBuf) -> FileInfo {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match fs::metadata(&path) {
        Ok(meta) => FileInfo {
            exists: true,
            is_directory: meta.is_dir(),
            name,
            physical_path: Some(path),
        },
        Err(_) => FileInfo::missing(name, Some(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_info_existing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("Js")).unwrap();
        fs::write(dir.path().join("Js/app.js"), "var a;").unwrap();

        let provider = PhysicalFileProvider::new(dir.path());
        let info = provider.file_info("Js/app.js");

        assert!(info.exists);
        assert!(!info.is_directory);
        assert_eq!(info.name, "app.js");
        assert_eq!(info.physical_path, Some(dir.path().join("Js").join("app.js")));
    }

    #[test]
    fn test_file_info_missing_keeps_physical_path() {
        let dir = TempDir::new().unwrap();
        let provider = PhysicalFileProvider::new(dir.path());
        let info = provider.file_info("Js/none.js");

        assert!(!info.exists);
        assert_eq!(info.physical_path, Some(dir.path().join("Js").join("none.js")));
    }

    #[test]
    fn test_directory_contents() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/a.css"), "a{}").unwrap();
        fs::write(dir.path().join("css/b.css"), "b{}").unwrap();

        let provider = PhysicalFileProvider::new(dir.path());
        let mut names: Vec<_> = provider
            .directory_contents("css")
            .into_iter()
            .map(|info| info.name)
            .collect();
        names.sort();

        assert_eq!(names, ["a.css", "b.css"]);
        assert!(provider.directory_contents("missing").is_empty());
    }

    #[test]
    fn test_read_directory_fails() {
        let dir = TempDir::new().unwrap();
        let provider = PhysicalFileProvider::new(dir.path());
        assert!(provider.read(dir.path()).is_err());
    }
}
