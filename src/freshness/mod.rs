//! Freshness detection: blake3 content hashes and the persisted image
//! cache manifest.

mod cache;
mod hash;
mod manifest;

pub use cache::{invalidate, set_cached_hash};
pub use hash::{ContentHash, compute_file_hash, hash_bytes};
pub use manifest::{ImageManifest, MANIFEST_FILE};
