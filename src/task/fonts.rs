//! Fonts task: copy font files into the dist tree, preserving structure.

use std::fs;

use anyhow::{Context, Result};

use crate::config::PipelineConfig;
use crate::log;
use crate::utils::plural::plural_count;

/// Run the fonts task. Returns the number of files copied.
pub fn run(config: &PipelineConfig) -> Result<usize> {
    let pattern = config.glob_for(&config.paths.fonts);
    let files = crate::utils::glob::matching_files(&pattern)?;
    let src_root = config.src_root_for(&config.paths.fonts);
    let dest_root = config.dest_for(&config.paths.fonts);

    let mut copied = 0;
    for file in &files {
        let rel = file
            .strip_prefix(&src_root)
            .with_context(|| format!("{} is outside the font root", file.display()))?;
        let dest = dest_root.join(rel);

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::copy(file, &dest)
            .with_context(|| format!("failed to copy {}", file.display()))?;
        copied += 1;
    }

    log!("fonts"; "copied {}", plural_count(copied, "file"));
    Ok(copied)
}
