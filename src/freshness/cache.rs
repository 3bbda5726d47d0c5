//! Global freshness cache for file content hashes.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::ContentHash;

/// Global cache for file content hashes (thread-safe).
///
/// Keys are canonicalized so the same file reached through different relative
/// paths shares one entry. The in-place image task hits this hard: the source
/// hash computed for the manifest check doubles as the output hash.
struct FreshnessCache {
    hashes: DashMap<PathBuf, ContentHash>,
}

impl FreshnessCache {
    fn new() -> Self {
        Self {
            hashes: DashMap::new(),
        }
    }

    fn get(&self, path: &Path) -> Option<ContentHash> {
        let canonical = path.canonicalize().ok()?;
        self.hashes.get(&canonical).map(|r| *r)
    }

    fn set(&self, path: &Path, hash: ContentHash) {
        if let Ok(canonical) = path.canonicalize() {
            self.hashes.insert(canonical, hash);
        }
    }

    fn invalidate(&self, path: &Path) {
        if let Ok(canonical) = path.canonicalize() {
            self.hashes.remove(&canonical);
        }
    }
}

/// Global freshness cache instance.
static FRESHNESS_CACHE: LazyLock<FreshnessCache> = LazyLock::new(FreshnessCache::new);

/// Get cached hash for a file.
#[inline]
pub(super) fn get_cached_hash(path: &Path) -> Option<ContentHash> {
    FRESHNESS_CACHE.get(path)
}

/// Store hash in global cache.
#[inline]
pub fn set_cached_hash(path: &Path, hash: ContentHash) {
    FRESHNESS_CACHE.set(path, hash);
}

/// Drop a stale entry (file rewritten on disk behind the cache's back).
#[inline]
pub fn invalidate(path: &Path) {
    FRESHNESS_CACHE.invalidate(path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cache_get_set() {
        let cache = FreshnessCache::new();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        fs::write(&path, "content").unwrap();

        let hash = ContentHash::new([1; 32]);
        cache.set(&path, hash);

        assert_eq!(cache.get(&path), Some(hash));
    }

    #[test]
    fn test_cache_invalidate() {
        let cache = FreshnessCache::new();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        fs::write(&path, "content").unwrap();

        let hash = ContentHash::new([1; 32]);
        cache.set(&path, hash);
        cache.invalidate(&path);

        assert_eq!(cache.get(&path), None);
    }

    #[test]
    fn test_cache_nonexistent_path() {
        let cache = FreshnessCache::new();
        assert_eq!(cache.get(Path::new("/no/such/file")), None);
    }
}
