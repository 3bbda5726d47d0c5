//! Image task: lossless recompression with a content-hash cache.
//!
//! PNGs are re-encoded at maximum compression, SVGs reserialized without
//! indentation; JPEG and GIF pass through unchanged. A recompressed result
//! only replaces the input when it is actually smaller. Results are recorded
//! in a persisted manifest keyed by blake3 content hash, so a second run
//! over an unchanged set does no compression work.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use crate::config::PipelineConfig;
use crate::freshness::{ImageManifest, compute_file_hash, hash_bytes, set_cached_hash};
use crate::log;
use crate::utils::path::rel_display;
use crate::utils::plural::plural_count;
use crate::debug;

/// What the image task did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImagesOutcome {
    /// Images recompressed (or copied) this run.
    pub processed: usize,
    /// Images skipped because the manifest matched.
    pub cached: usize,
}

/// Run the image task.
pub fn run(config: &PipelineConfig) -> Result<ImagesOutcome> {
    let pattern = config.glob_for(&config.paths.images);
    let files = crate::utils::glob::matching_files(&pattern)?;
    let src_root = config.src_root_for(&config.paths.images);
    let dest_root = config.dest_for(&config.paths.images);

    let mut manifest = ImageManifest::load(&config.cache_dir());
    let mut outcome = ImagesOutcome::default();

    for file in &files {
        let rel = file
            .strip_prefix(&src_root)
            .with_context(|| format!("{} is outside the image root", file.display()))?;
        let rel_key = rel.to_string_lossy().replace('\\', "/");
        let dest = dest_root.join(rel);

        let source_hash = compute_file_hash(file);
        if source_hash.is_empty() {
            return Err(anyhow!("failed to read {}", file.display()));
        }

        if manifest.is_fresh(&rel_key, source_hash, &dest) {
            debug!("images"; "cached: {}", rel_key);
            outcome.cached += 1;
            continue;
        }

        let output_hash = process_one(file, &dest, config)
            .with_context(|| format!("images: {}", rel_display(file, &config.root)))?;
        manifest.record(&rel_key, source_hash, output_hash);
        outcome.processed += 1;
    }

    manifest.save()?;

    log!(
        "images";
        "{} processed, {} cached",
        plural_count(outcome.processed, "image"),
        outcome.cached
    );

    Ok(outcome)
}

/// Compress one image into its destination. Returns the output content hash.
fn process_one(
    source: &Path,
    dest: &Path,
    config: &PipelineConfig,
) -> Result<crate::freshness::ContentHash> {
    let data = fs::read(source)
        .with_context(|| format!("failed to read {}", source.display()))?;

    let ext = source
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let recompressed = match ext.as_str() {
        "png" if config.images.png => Some(recompress_png(&data)?),
        "svg" if config.images.svg => Some(recompress_svg(&data)?),
        _ => None,
    };

    // Keep the smaller rendition; a passthrough or a larger re-encode keeps
    // the original bytes
    let output: &[u8] = match &recompressed {
        Some(bytes) if bytes.len() < data.len() => bytes,
        _ => &data,
    };

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    // In-place optimization with unchanged bytes needs no write at all
    let in_place = source == dest;
    if !(in_place && output.len() == data.len()) {
        fs::write(dest, output)
            .with_context(|| format!("failed to write {}", dest.display()))?;
    }

    let output_hash = hash_bytes(output);
    set_cached_hash(dest, output_hash);
    Ok(output_hash)
}

/// Re-encode a PNG losslessly at maximum compression.
fn recompress_png(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data).context("failed to decode PNG")?;

    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder)
        .context("failed to re-encode PNG")?;
    Ok(out)
}

/// Reserialize an SVG without indentation.
fn recompress_svg(data: &[u8]) -> Result<Vec<u8>> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default())
        .map_err(|e| anyhow!("failed to parse SVG: {e}"))?;

    let write_options = usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    };
    Ok(tree.to_string(&write_options).into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use tempfile::TempDir;

    fn make_config(root: &Path) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.root = root.to_path_buf();
        config
    }

    /// A PNG with enough redundancy that max compression beats the default.
    fn write_test_png(path: &Path) {
        let mut img = image::RgbaImage::new(64, 64);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            *pixel = image::Rgba([(x % 2 * 255) as u8, 0, 0, 255]);
        }
        img.save(path).unwrap();
    }

    #[test]
    fn test_images_task_processes_then_caches() {
        let dir = TempDir::new().unwrap();
        let images = dir.path().join("app/images");
        fs::create_dir_all(images.join("icons")).unwrap();
        write_test_png(&images.join("banner.png"));
        fs::write(
            images.join("icons/dot.svg"),
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\" height=\"10\">\n    <circle cx=\"5\" cy=\"5\" r=\"4\" fill=\"red\"/>\n</svg>",
        )
        .unwrap();

        let config = make_config(dir.path());

        // First run does the work
        let first = run(&config).unwrap();
        assert_eq!(first.processed, 2);
        assert_eq!(first.cached, 0);

        // Second run over the unchanged set is all cache hits
        let second = run(&config).unwrap();
        assert_eq!(second.processed, 0);
        assert_eq!(second.cached, 2);
    }

    #[test]
    fn test_images_task_reprocesses_modified_file() {
        let dir = TempDir::new().unwrap();
        let images = dir.path().join("app/images");
        fs::create_dir_all(&images).unwrap();
        write_test_png(&images.join("a.png"));

        let config = make_config(dir.path());
        run(&config).unwrap();

        // Replace the image content on disk
        let mut img = image::RgbaImage::new(16, 16);
        img.enumerate_pixels_mut()
            .for_each(|(x, y, p)| *p = image::Rgba([x as u8, y as u8, 0, 255]));
        img.save(images.join("a.png")).unwrap();
        // The per-process hash cache does not see external writes; drop the
        // stale entry the way a fresh CLI invocation would
        crate::freshness::invalidate(&images.join("a.png"));

        let rerun = run(&config).unwrap();
        assert_eq!(rerun.processed, 1);
    }

    #[test]
    fn test_images_task_passthrough_kinds_copied_once() {
        let dir = TempDir::new().unwrap();
        let images = dir.path().join("app/images");
        fs::create_dir_all(&images).unwrap();
        // Not a real JPEG; passthrough never decodes it
        fs::write(images.join("photo.jpg"), vec![0xff, 0xd8, 0xff, 0xe0, 1, 2, 3]).unwrap();

        let config = make_config(dir.path());
        let first = run(&config).unwrap();
        assert_eq!(first.processed, 1);

        let second = run(&config).unwrap();
        assert_eq!(second.cached, 1);
    }

    #[test]
    fn test_svg_recompression_strips_whitespace() {
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"10\" height=\"10\">\n    <rect width=\"10\" height=\"10\"/>\n</svg>";
        let out = recompress_svg(svg).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("\n    "));
    }

    #[test]
    fn test_corrupt_png_is_fatal() {
        let dir = TempDir::new().unwrap();
        let images = dir.path().join("app/images");
        fs::create_dir_all(&images).unwrap();
        fs::write(images.join("broken.png"), b"not a png").unwrap();

        let config = make_config(dir.path());
        assert!(run(&config).is_err());
    }
}
