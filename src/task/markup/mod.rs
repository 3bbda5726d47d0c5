//! Markup task: resolve build blocks and emit dist pages.
//!
//! For each page matching the markup glob, referenced build blocks are
//! resolved: script blocks are concatenated and minified (with a source
//! map), stylesheet blocks are concatenated unchanged, `remove` blocks are
//! dropped. The resolved page lands in the dist directory and connected
//! clients get a full reload.
//!
//! Unlike the style task, any failure here (missing reference, invalid
//! script) aborts the task.

mod blocks;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::asset::minify::minify_js;
use crate::config::PipelineConfig;
use crate::log;
use crate::reload::{ReloadHub, ReloadMessage};
use crate::utils::path::rel_display;
use crate::utils::plural::plural_count;

use blocks::{BlockKind, BuildBlock, find_blocks};

/// Run the markup task. Returns the number of pages written.
pub fn run(config: &PipelineConfig, hub: &ReloadHub) -> Result<usize> {
    let pattern = config.glob_for(&config.paths.markup);
    let files = crate::utils::glob::matching_files(&pattern)?;
    let dest = config.dest_for(&config.paths.markup);

    fs::create_dir_all(&dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;

    for file in &files {
        process_page(file, &dest)
            .with_context(|| format!("markup: {}", rel_display(file, &config.root)))?;
    }

    if !files.is_empty() {
        hub.broadcast(&ReloadMessage::reload("markup rebuilt"));
    }

    log!("html"; "wrote {}", plural_count(files.len(), "page"));
    Ok(files.len())
}

/// Resolve one page's build blocks and write it into the dist directory.
fn process_page(page: &Path, dest: &Path) -> Result<()> {
    let html = fs::read_to_string(page)
        .with_context(|| format!("failed to read {}", page.display()))?;
    let page_dir = page
        .parent()
        .ok_or_else(|| anyhow!("page has no parent directory"))?;

    let blocks = find_blocks(&html)?;

    // Splice back-to-front so earlier spans stay valid
    let mut output = html.clone();
    for block in blocks.iter().rev() {
        resolve_block(block, page_dir, dest)?;
        let (start, end) = block.span;
        output.replace_range(start..end, &block.replacement_tag());
    }

    let file_name = page
        .file_name()
        .ok_or_else(|| anyhow!("page has no file name"))?;
    let out_path = dest.join(file_name);
    fs::write(&out_path, output)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    Ok(())
}

/// Build a block's concatenated target asset.
fn resolve_block(block: &BuildBlock, page_dir: &Path, dest: &Path) -> Result<()> {
    if block.kind == BlockKind::Remove {
        return Ok(());
    }

    let concatenated = concat_refs(&block.refs, page_dir)?;
    let target = dest.join(&block.target);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    match block.kind {
        BlockKind::Js => {
            let map_name = format!(
                "{}.map",
                target
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| anyhow!("invalid target path '{}'", block.target))?
            );
            let minified = minify_js(&concatenated, Some(Path::new(&block.target)))
                .ok_or_else(|| {
                    anyhow!("script block '{}' is not valid JavaScript", block.target)
                })?;

            let mut code = minified.code;
            if let Some(map) = minified.map {
                code.push_str(&format!("\n//# sourceMappingURL={map_name}"));
                fs::write(target.with_file_name(&map_name), map)
                    .with_context(|| format!("failed to write {map_name}"))?;
            }
            fs::write(&target, code)
                .with_context(|| format!("failed to write {}", target.display()))?;
        }
        BlockKind::Css => {
            // Only script blocks are minified; stylesheets pass through
            fs::write(&target, concatenated)
                .with_context(|| format!("failed to write {}", target.display()))?;
        }
        BlockKind::Remove => unreachable!("handled above"),
    }

    Ok(())
}

/// Read and concatenate a block's referenced files, in document order.
fn concat_refs(refs: &[String], page_dir: &Path) -> Result<String> {
    let mut combined = String::new();
    for reference in refs {
        let path = resolve_ref(reference, page_dir);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read referenced file {}", path.display()))?;
        combined.push_str(&content);
        if !combined.ends_with('\n') {
            combined.push('\n');
        }
    }
    Ok(combined)
}

/// References resolve relative to the page; a leading `/` is app-absolute,
/// which for a top-level page is the same directory.
fn resolve_ref(reference: &str, page_dir: &Path) -> PathBuf {
    page_dir.join(reference.trim_start_matches('/'))
}
