//! Mapping of untrusted request paths onto the served directory tree.
//!
//! Resolution is purely lexical: `.` and `..` segments are folded without
//! touching the filesystem and symlinks are not followed. A symlink inside
//! the root that points elsewhere is therefore served as-is.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::Rejection;

/// The directory tree exposed by the server.
///
/// Built once at startup; the stored path is absolute and lexically
/// normalized so every containment check compares like with like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootDirectory {
    path: PathBuf,
}

/// A filesystem path proven to lie inside a [`RootDirectory`].
///
/// Only [`RootDirectory::resolve`] constructs these, so anything typed
/// `ResolvedPath` has already passed the containment check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    request_path: String,
}

impl RootDirectory {
    /// Canonicalize `path` into a root. Relative paths are taken against the
    /// current working directory.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let absolute = std::path::absolute(path.as_ref())?;
        Ok(Self {
            path: normalize_lexically(&absolute),
        })
    }

    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Resolve a client-supplied request path (e.g. `/docs/readme.txt`).
    ///
    /// The target does not need to exist. An empty path or `/` yields the
    /// root itself.
    pub fn resolve(&self, request_path: &str) -> Result<ResolvedPath, Rejection> {
        if request_path.contains('\0') {
            warn!("Request path contains null byte");
            return Err(Rejection::InvalidPath);
        }

        // A leading separator would make `join` replace the root outright.
        let relative = request_path.trim_start_matches('/');
        let joined = if relative.is_empty() {
            self.path.clone()
        } else {
            self.path.join(relative)
        };

        let absolute = std::path::absolute(&joined).map_err(|_| Rejection::InvalidPath)?;
        let candidate = normalize_lexically(&absolute);

        if !self.contains(&candidate) {
            warn!(
                "Path traversal attempt: {:?} resolves outside root",
                request_path
            );
            return Err(Rejection::PathEscape);
        }

        let request_path = request_path_of(&self.path, &candidate);
        Ok(ResolvedPath {
            path: candidate,
            request_path,
        })
    }

    /// Containment on component boundaries: `/srv` contains `/srv` and
    /// `/srv/a`, but not `/srv-other`.
    fn contains(&self, candidate: &Path) -> bool {
        candidate == self.path || candidate.starts_with(&self.path)
    }
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Normalized request path of this target, `/`-separated with a leading
    /// slash. The root is `/`.
    pub fn request_path(&self) -> &str {
        &self.request_path
    }

    pub fn is_root(&self) -> bool {
        self.request_path == "/"
    }

    /// Final path segment, or an empty string for the root.
    pub fn file_name(&self) -> String {
        if self.is_root() {
            return String::new();
        }
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Request path of a direct child named `name`.
    pub fn child_request_path(&self, name: &str) -> String {
        if self.is_root() {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.request_path)
        }
    }

    /// A direct child of this path, as returned by a directory listing.
    ///
    /// Returns `None` for names that are not a single normal segment
    /// (`.`, `..`, anything containing a separator), which would otherwise
    /// break containment.
    pub fn child(&self, name: &OsStr) -> Option<ResolvedPath> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(segment)), None) if segment == name => {}
            _ => return None,
        }

        let display = name.to_string_lossy();
        Some(ResolvedPath {
            path: self.path.join(name),
            request_path: self.child_request_path(&display),
        })
    }
}

/// Fold `.` and `..` segments and drop trailing separators without consulting
/// the filesystem. `..` at the top level stays at the top level.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

fn request_path_of(root: &Path, full_path: &Path) -> String {
    let Ok(relative) = full_path.strip_prefix(root) else {
        return "/".to_string();
    };

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn srv() -> RootDirectory {
        RootDirectory::new("/srv").unwrap()
    }

    #[test]
    fn test_root_is_normalized() {
        let root = RootDirectory::new("/srv/./data/../").unwrap();
        assert_eq!(root.as_path(), Path::new("/srv"));
    }

    #[test]
    fn test_relative_root_becomes_absolute() {
        let root = RootDirectory::new("./srv").unwrap();
        assert!(root.as_path().is_absolute());
        assert!(root.as_path().ends_with("srv"));
    }

    #[test]
    fn test_resolve_empty_and_slash_yield_root() {
        let root = srv();

        let empty = root.resolve("").unwrap();
        assert_eq!(empty.as_path(), root.as_path());
        assert!(empty.is_root());

        let slash = root.resolve("/").unwrap();
        assert_eq!(slash.as_path(), root.as_path());
        assert_eq!(slash.request_path(), "/");
    }

    #[test]
    fn test_resolve_normal() {
        let result = srv().resolve("/docs/readme.txt").unwrap();
        assert_eq!(result.as_path(), Path::new("/srv/docs/readme.txt"));
        assert_eq!(result.request_path(), "/docs/readme.txt");
        assert_eq!(result.file_name(), "readme.txt");
    }

    #[test]
    fn test_resolve_collapses_redundant_segments() {
        let result = srv().resolve("//docs/./guides//intro/").unwrap();
        assert_eq!(result.as_path(), Path::new("/srv/docs/guides/intro"));
        assert_eq!(result.request_path(), "/docs/guides/intro");
    }

    #[test]
    fn test_resolve_allows_parent_segments_that_stay_inside() {
        let result = srv().resolve("/docs/../notes/a.txt").unwrap();
        assert_eq!(result.as_path(), Path::new("/srv/notes/a.txt"));

        let result = srv().resolve("/docs/..").unwrap();
        assert!(result.is_root());
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = srv();
        assert_eq!(root.resolve("/../etc/passwd"), Err(Rejection::PathEscape));
        assert_eq!(root.resolve("/../../etc/passwd"), Err(Rejection::PathEscape));
        assert_eq!(root.resolve(".."), Err(Rejection::PathEscape));
        assert_eq!(root.resolve("/docs/../../x"), Err(Rejection::PathEscape));
    }

    #[test]
    fn test_resolve_rejects_adjacent_directory() {
        // Joins to /srv-other/secret, which shares "/srv" as a string prefix.
        let result = srv().resolve("/../srv-other/secret");
        assert_eq!(result, Err(Rejection::PathEscape));
    }

    #[test]
    fn test_resolve_parent_back_into_root_is_allowed() {
        let result = srv().resolve("/../srv/a.txt").unwrap();
        assert_eq!(result.as_path(), Path::new("/srv/a.txt"));
    }

    #[test]
    fn test_resolve_rejects_null_bytes() {
        assert_eq!(srv().resolve("/file\0.txt"), Err(Rejection::InvalidPath));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let root = srv();
        for input in ["", "/", "/a/b", "/a/../b", "/../x", "/a\0"] {
            assert_eq!(root.resolve(input), root.resolve(input));
        }
    }

    #[test]
    fn test_resolve_without_parent_segments_stays_inside() {
        let root = srv();
        for input in ["/a", "/a/b/c.txt", "/.hidden", "/a b/c", "/...", "/a/./b"] {
            let resolved = root.resolve(input).unwrap();
            assert!(resolved.as_path().starts_with(root.as_path()));
            assert_ne!(resolved.as_path(), root.as_path());
        }
    }

    #[test]
    fn test_resolve_does_not_touch_filesystem() {
        let root = RootDirectory::new("/definitely/not/here").unwrap();
        let result = root.resolve("/missing.txt").unwrap();
        assert_eq!(
            result.as_path(),
            Path::new("/definitely/not/here/missing.txt")
        );
    }

    #[test]
    fn test_child_request_path() {
        let root = srv();
        assert_eq!(root.resolve("/").unwrap().child_request_path("a.txt"), "/a.txt");
        assert_eq!(
            root.resolve("/sub").unwrap().child_request_path("a.txt"),
            "/sub/a.txt"
        );
    }

    #[test]
    fn test_child_rejects_non_segment_names() {
        let sub = srv().resolve("/sub").unwrap();

        let child = sub.child(OsStr::new("a.txt")).unwrap();
        assert_eq!(child.as_path(), Path::new("/srv/sub/a.txt"));
        assert_eq!(child.request_path(), "/sub/a.txt");

        assert!(sub.child(OsStr::new("..")).is_none());
        assert!(sub.child(OsStr::new(".")).is_none());
        assert!(sub.child(OsStr::new("a/b")).is_none());
        assert!(sub.child(OsStr::new("")).is_none());
    }

    #[test]
    fn test_normalize_lexically_stops_at_top() {
        assert_eq!(
            normalize_lexically(Path::new("/../../etc")),
            PathBuf::from("/etc")
        );
    }

    // ========================================================================
    // Generated inputs
    // ========================================================================

    /// A single path segment that is never `..`.
    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_. -]{1,8}".prop_filter("parent segment", |s| s != "..")
    }

    fn segment_or_parent() -> impl Strategy<Value = String> {
        prop_oneof![3 => segment(), 1 => Just("..".to_string())]
    }

    /// Where `/srv` joined with `segments` lands after folding `.` and `..`,
    /// or `None` when that location is not `/srv` or below it.
    fn expected_target(segments: &[String]) -> Option<PathBuf> {
        let mut stack = vec!["srv".to_string()];
        for segment in segments {
            match segment.as_str() {
                "." => {}
                ".." => {
                    stack.pop();
                }
                other => stack.push(other.to_string()),
            }
        }

        if stack.first().map(String::as_str) == Some("srv") {
            Some(PathBuf::from(format!("/{}", stack.join("/"))))
        } else {
            None
        }
    }

    proptest! {
        #[test]
        fn test_resolve_without_parent_segments_always_inside(
            segments in prop::collection::vec(segment(), 0..8)
        ) {
            let root = srv();
            let request = format!("/{}", segments.join("/"));

            let resolved = root.resolve(&request).unwrap();
            prop_assert!(resolved.as_path().starts_with(root.as_path()));
            prop_assert_eq!(Some(resolved.as_path().to_path_buf()), expected_target(&segments));
        }

        #[test]
        fn test_resolve_matches_segment_walk(
            segments in prop::collection::vec(segment_or_parent(), 0..10)
        ) {
            let root = srv();
            let request = format!("/{}", segments.join("/"));

            match (root.resolve(&request), expected_target(&segments)) {
                (Ok(resolved), Some(expected)) => {
                    prop_assert_eq!(resolved.as_path(), expected.as_path());
                    prop_assert!(resolved.as_path().starts_with(root.as_path()));
                }
                (Err(rejection), None) => prop_assert_eq!(rejection, Rejection::PathEscape),
                (actual, expected) => {
                    prop_assert!(false, "{:?}: got {:?}, expected {:?}", request, actual, expected);
                }
            }
        }

        #[test]
        fn test_resolve_arbitrary_input_is_stable_and_contained(request in any::<String>()) {
            let root = srv();
            let first = root.resolve(&request);
            prop_assert_eq!(&first, &root.resolve(&request));

            match first {
                Ok(resolved) => {
                    prop_assert!(resolved.as_path().starts_with(root.as_path()));
                    prop_assert!(resolved.request_path().starts_with('/'));
                }
                Err(Rejection::InvalidPath) => prop_assert!(request.contains('\0')),
                Err(Rejection::PathEscape) => prop_assert!(request.contains("..")),
            }
        }
    }
}
