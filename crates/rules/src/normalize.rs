//! Lexical resource path normalization.

use std::path::{is_separator, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};

/// Normalize a resource path without touching the filesystem.
///
/// - `/` and the platform separator both split segments
/// - repeated separators collapse
/// - `.` segments are removed
/// - `..` pops the previous segment; it is kept at the front of relative
///   paths and dropped at the root of absolute ones
/// - an empty result becomes `.`
/// - a trailing separator survives
///
/// The result is joined with the platform separator.
pub fn normalize_resource_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let is_absolute = path.starts_with(is_separator);
    let trailing = path.ends_with(is_separator);

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if is_absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let mut normalized = segments.join(MAIN_SEPARATOR_STR);
    if is_absolute {
        normalized.insert(0, MAIN_SEPARATOR);
    }
    if normalized.is_empty() {
        normalized.push('.');
    }
    if trailing && !normalized.ends_with(MAIN_SEPARATOR) {
        normalized.push(MAIN_SEPARATOR);
    }
    normalized
}

#[cfg(all(test, unix))]
mod tests {
    use super::normalize_resource_path;

    #[test]
    fn collapses_separators_and_dots() {
        assert_eq!(normalize_resource_path("a//b/./c"), "a/b/c");
        assert_eq!(normalize_resource_path("/tmp///foo//bar"), "/tmp/foo/bar");
        assert_eq!(normalize_resource_path("./index.html"), "index.html");
    }

    #[test]
    fn resolves_parent_segments() {
        assert_eq!(normalize_resource_path("a/b/../c"), "a/c");
        assert_eq!(normalize_resource_path("a/b/../../c"), "c");
        assert_eq!(normalize_resource_path("../a/../b"), "../b");
        assert_eq!(normalize_resource_path("../../x"), "../../x");
        assert_eq!(normalize_resource_path("/../etc/passwd"), "/etc/passwd");
    }

    #[test]
    fn keeps_trailing_separator() {
        assert_eq!(normalize_resource_path("locked/"), "locked/");
        assert_eq!(normalize_resource_path("locked/unlocked//"), "locked/unlocked/");
        assert_eq!(normalize_resource_path("a/b/../"), "a/");
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(normalize_resource_path(""), ".");
        assert_eq!(normalize_resource_path("."), ".");
        assert_eq!(normalize_resource_path("./"), "./");
        assert_eq!(normalize_resource_path("a/.."), ".");
        assert_eq!(normalize_resource_path("/"), "/");
        assert_eq!(normalize_resource_path("//"), "/");
    }
}
