//! Application-relative asset identifiers.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::normalize::to_forward_slashes;
use crate::error::{BundleError, Result};

/// A validated virtual path such as `~/Js/app.js`.
///
/// Always starts with the virtual root marker it was parsed with, uses `/`
/// separators, and contains no empty, `.` or `..` segments. Segments never
/// contain `:`, so a path cannot name a drive or stream on the host.
///
/// The string the caller supplied is kept for diagnostics; equality, ordering
/// and hashing use the normalized form only.
#[derive(Clone)]
pub struct VirtualPath {
    raw: String,
    root_len: usize,
    input: String,
}

impl VirtualPath {
    /// Parse `raw` against the virtual root marker `root` (e.g. `~/`).
    ///
    /// Backslashes are accepted and normalized to `/`; repeated separators
    /// collapse. Paths that do not start with the marker, or that try to
    /// leave the root, are rejected.
    pub fn parse(raw: &str, root: &str) -> Result<Self> {
        let normalized = to_forward_slashes(raw.trim());
        let Some(rest) = normalized.strip_prefix(root) else {
            return Err(BundleError::invalid_path(
                raw,
                format!("virtual paths must start with `{root}`"),
            ));
        };

        let mut segments = Vec::new();
        for segment in rest.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(BundleError::invalid_path(
                    raw,
                    "relative segments are not allowed",
                ));
            }
            if segment.contains(':') {
                return Err(BundleError::invalid_path(
                    raw,
                    "segments may not contain `:`",
                ));
            }
            segments.push(segment);
        }

        Ok(Self {
            input: raw.to_string(),
            ..Self::from_parts(root, &segments.join("/"))
        })
    }

    pub(crate) fn from_parts(root: &str, sub_path: &str) -> Self {
        let raw = format!("{root}{sub_path}");
        Self {
            input: raw.clone(),
            raw,
            root_len: root.len(),
        }
    }

    /// The full path including the root marker.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The string this path was parsed from, before normalization.
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The root marker this path was parsed with.
    #[inline]
    pub fn root(&self) -> &str {
        &self.raw[..self.root_len]
    }

    /// The part after the root marker, relative to the web root.
    #[inline]
    pub fn sub_path(&self) -> &str {
        &self.raw[self.root_len..]
    }

    /// Final segment, empty for the root itself.
    pub fn file_name(&self) -> &str {
        self.sub_path().rsplit('/').next().unwrap_or_default()
    }

    /// Extension of the final segment, without the dot.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// Append a single child segment.
    pub fn join(&self, child: &str) -> Self {
        let sub = self.sub_path();
        if sub.is_empty() {
            Self::from_parts(self.root(), child)
        } else {
            Self::from_parts(self.root(), &format!("{sub}/{child}"))
        }
    }
}

impl PartialEq for VirtualPath {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw && self.root_len == other.root_len
    }
}

impl Eq for VirtualPath {}

impl Hash for VirtualPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
        self.root_len.hash(state);
    }
}

impl PartialOrd for VirtualPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VirtualPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw
            .cmp(&other.raw)
            .then(self.root_len.cmp(&other.root_len))
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VirtualPath({})", self.raw)
    }
}

impl AsRef<str> for VirtualPath {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
