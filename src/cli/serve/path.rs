//! URL to file path resolution.

use std::path::{Component, Path, PathBuf};

/// Resolve a request URL to a file under the serve root.
///
/// - query strings and fragments are stripped
/// - directory URLs resolve to their `index.html`
/// - paths escaping the root (`..`) are rejected
///
/// Returns `None` when no file exists for the URL.
pub fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let relative = Path::new(path.trim_start_matches('/'));

    // Reject traversal before touching the filesystem
    if relative
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return None;
    }

    let mut candidate = root.join(relative);
    if candidate.is_dir() {
        candidate = candidate.join("index.html");
    }

    candidate.is_file().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("css/main.css"), "body{}").unwrap();
        dir
    }

    #[test]
    fn test_resolve_file() {
        let root = make_root();
        let resolved = resolve_path("/css/main.css", root.path()).unwrap();
        assert!(resolved.ends_with("css/main.css"));
    }

    #[test]
    fn test_resolve_root_to_index() {
        let root = make_root();
        let resolved = resolve_path("/", root.path()).unwrap();
        assert!(resolved.ends_with("index.html"));
    }

    #[test]
    fn test_resolve_strips_query() {
        let root = make_root();
        let resolved = resolve_path("/css/main.css?t=12345", root.path()).unwrap();
        assert!(resolved.ends_with("css/main.css"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let root = make_root();
        assert!(resolve_path("/../etc/passwd", root.path()).is_none());
    }

    #[test]
    fn test_resolve_missing_file() {
        let root = make_root();
        assert!(resolve_path("/missing.html", root.path()).is_none());
    }
}
