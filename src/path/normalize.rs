//! Separator and prefix helpers.

use std::path::Path;

/// Replace every `\` with `/`.
#[inline]
pub fn to_forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Render a physical path with `/` separators regardless of host OS.
#[inline]
pub fn physical_to_slashes(path: &Path) -> String {
    to_forward_slashes(&path.to_string_lossy())
}

/// Strip `root` from the front of `path` exactly once.
///
/// Both inputs may use either separator. The match must end on a segment
/// boundary, so `/www` is not a prefix of `/wwwroot/a.js`. Returns the
/// remainder without leading slashes, or `None` when `path` is not under
/// `root`. An empty root (or `/`) contains every path.
pub fn strip_root(path: &str, root: &str, case_insensitive: bool) -> Option<String> {
    let path = to_forward_slashes(path);
    let root = to_forward_slashes(root);
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return Some(path.trim_start_matches('/').to_string());
    }

    let head = path.get(..root.len())?;
    let matches = if case_insensitive {
        head.eq_ignore_ascii_case(root)
    } else {
        head == root
    };
    if !matches {
        return None;
    }

    let rest = &path[root.len()..];
    if !rest.is_empty() && !rest.starts_with('/') {
        return None;
    }
    Some(rest.trim_start_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_forward_slashes() {
        assert_eq!(to_forward_slashes("Js\\lib\\a.js"), "Js/lib/a.js");
        assert_eq!(to_forward_slashes("Js/a.js"), "Js/a.js");
    }

    #[test]
    fn test_strip_root_mixed_separators() {
        let rest = strip_root("C:\\MySolution\\MyProject/Js/Test1.js", "C:\\MySolution\\MyProject", false);
        assert_eq!(rest.as_deref(), Some("Js/Test1.js"));
    }

    #[test]
    fn test_strip_root_trailing_separator() {
        let rest = strip_root("/srv/www/a.js", "/srv/www/", false);
        assert_eq!(rest.as_deref(), Some("a.js"));
    }

    #[test]
    fn test_strip_root_segment_boundary() {
        assert_eq!(strip_root("/srv/wwwroot/a.js", "/srv/www", false), None);
    }

    #[test]
    fn test_strip_root_case() {
        assert_eq!(strip_root("C:/Site/a.js", "c:/site", false), None);
        assert_eq!(
            strip_root("C:/Site/a.js", "c:/site", true).as_deref(),
            Some("a.js")
        );
    }

    #[test]
    fn test_strip_root_only_once() {
        let rest = strip_root("/www/www/a.js", "/www", false);
        assert_eq!(rest.as_deref(), Some("www/a.js"));
    }

    #[test]
    fn test_strip_root_empty_root() {
        assert_eq!(strip_root("Js/a.js", "", false).as_deref(), Some("Js/a.js"));
        assert_eq!(strip_root("/Js/a.js", "/", false).as_deref(), Some("Js/a.js"));
    }
}
