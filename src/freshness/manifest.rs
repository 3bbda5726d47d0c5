//! Persisted image cache manifest.
//!
//! Maps each image's path (relative to the image source root) to the content
//! hashes seen on the last run. A repeated build over an unchanged image set
//! skips recompression entirely.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::{ContentHash, compute_file_hash};

/// Manifest file name inside the cache directory.
pub const MANIFEST_FILE: &str = "images.json";

/// Hashes recorded for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Source content hash (blake3 hex) at the last run.
    pub source: String,
    /// Output content hash after compression. Equal to `source` when the
    /// file was passed through unchanged.
    pub output: String,
}

/// Index mapping relative image paths to cache metadata.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ImageManifest {
    /// Relative path -> recorded hashes
    pub entries: FxHashMap<String, ImageEntry>,
    /// Manifest creation time (Unix timestamp in seconds)
    #[serde(default)]
    pub created_at: u64,

    #[serde(skip)]
    path: PathBuf,
}

impl ImageManifest {
    /// Load the manifest from the cache directory, or start fresh.
    ///
    /// A missing or corrupt manifest is not an error: the task just runs
    /// without cache hits and rewrites it.
    pub fn load(cache_dir: &Path) -> Self {
        let path = cache_dir.join(MANIFEST_FILE);

        let mut manifest = fs::read_to_string(&path)
            .ok()
            .and_then(|content| match serde_json::from_str::<Self>(&content) {
                Ok(m) => Some(m),
                Err(e) => {
                    crate::debug!("images"; "discarding corrupt manifest: {}", e);
                    None
                }
            })
            .unwrap_or_else(|| Self {
                created_at: current_timestamp(),
                ..Self::default()
            });

        manifest.path = path;
        manifest
    }

    /// Check whether an image is up to date.
    ///
    /// Fresh means: the current source hash matches either recorded hash
    /// (in-place optimization rewrites the source with the output bytes), and
    /// the output file still carries the recorded output hash.
    pub fn is_fresh(&self, rel: &str, source_hash: ContentHash, output: &Path) -> bool {
        let Some(entry) = self.entries.get(rel) else {
            return false;
        };

        let hex = source_hash.to_hex();
        if hex != entry.source && hex != entry.output {
            return false;
        }

        output.exists() && compute_file_hash(output).to_hex() == entry.output
    }

    /// Record the hashes observed for an image on this run.
    pub fn record(&mut self, rel: &str, source_hash: ContentHash, output_hash: ContentHash) {
        self.entries.insert(
            rel.to_string(),
            ImageEntry {
                source: source_hash.to_hex(),
                output: output_hash.to_hex(),
            },
        );
    }

    /// Persist the manifest to disk.
    pub fn save(&self) -> Result<()> {
        let parent = self
            .path
            .parent()
            .context("manifest path has no parent directory")?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        let json = serde_json::to_string_pretty(self)?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

/// Get current Unix timestamp in seconds
fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness::hash_bytes;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_manifest_is_empty() {
        let dir = TempDir::new().unwrap();
        let manifest = ImageManifest::load(dir.path());
        assert!(manifest.entries.is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();

        let mut manifest = ImageManifest::load(dir.path());
        manifest.record("icons/logo.png", hash_bytes(b"src"), hash_bytes(b"out"));
        manifest.save().unwrap();

        let reloaded = ImageManifest::load(dir.path());
        assert_eq!(reloaded.entries.len(), 1);
        assert_eq!(
            reloaded.entries["icons/logo.png"].source,
            hash_bytes(b"src").to_hex()
        );
    }

    #[test]
    fn test_corrupt_manifest_starts_fresh() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "not json {").unwrap();

        let manifest = ImageManifest::load(dir.path());
        assert!(manifest.entries.is_empty());
    }

    #[test]
    fn test_is_fresh_in_place() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("logo.png");
        fs::write(&image, b"optimized bytes").unwrap();
        let out_hash = hash_bytes(b"optimized bytes");

        let mut manifest = ImageManifest::load(dir.path());
        // Original source hash differs; output was written in place
        manifest.record("logo.png", hash_bytes(b"original bytes"), out_hash);

        // The file on disk now hashes to the recorded output -> fresh
        assert!(manifest.is_fresh("logo.png", out_hash, &image));
    }

    #[test]
    fn test_is_fresh_rejects_modified_source() {
        let dir = TempDir::new().unwrap();
        let image = dir.path().join("logo.png");
        fs::write(&image, b"edited").unwrap();

        let mut manifest = ImageManifest::load(dir.path());
        manifest.record("logo.png", hash_bytes(b"old"), hash_bytes(b"old-out"));

        assert!(!manifest.is_fresh("logo.png", hash_bytes(b"edited"), &image));
    }

    #[test]
    fn test_is_fresh_requires_output_present() {
        let dir = TempDir::new().unwrap();
        let src_hash = hash_bytes(b"src");

        let mut manifest = ImageManifest::load(dir.path());
        manifest.record("logo.png", src_hash, src_hash);

        assert!(!manifest.is_fresh("logo.png", src_hash, &dir.path().join("missing.png")));
    }
}
