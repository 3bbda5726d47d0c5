//! Style task: compile, prefix, minify, map.
//!
//! For each non-partial stylesheet matching the styles glob:
//! 1. compile SCSS with grass (load path = the file's directory, so
//!    `@use`/`@import` resolve against siblings and subdirectories)
//! 2. vendor-prefix and minify with lightningcss against the configured
//!    browser matrix
//! 3. emit a source map and append the sourceMappingURL comment
//!
//! A compile error in one file is displayed and skipped; the rest of the
//! batch still builds.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::Targets;
use parcel_sourcemap::SourceMap;

use crate::config::{PipelineConfig, StyleConfig};
use crate::log;
use crate::logger;
use crate::reload::{ReloadHub, ReloadMessage};
use crate::utils::path::rel_display;
use crate::utils::plural::plural_count;

/// What the style task produced.
pub struct StyleOutcome {
    /// Compiled stylesheets, in input order.
    pub written: Vec<PathBuf>,
    /// Inputs that failed to compile.
    pub failed: usize,
}

/// Run the style task.
///
/// Notifies the hub with a CSS refresh message per compiled stylesheet, so
/// connected clients swap styles without a page reload.
pub fn run(config: &PipelineConfig, hub: &ReloadHub) -> Result<StyleOutcome> {
    let pattern = config.glob_for(&config.paths.styles);
    let files = crate::utils::glob::matching_files(&pattern)?;
    let dest = config.dest_for(&config.paths.styles);

    fs::create_dir_all(&dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;

    let mut outcome = StyleOutcome {
        written: Vec::new(),
        failed: 0,
    };

    for file in &files {
        if is_partial(file) {
            continue;
        }

        match compile_one(file, &dest, &config.style) {
            Ok(css_path) => {
                if let Some(href) = served_href(&css_path, &config.serve_root()) {
                    hub.broadcast(&ReloadMessage::css(href));
                }
                outcome.written.push(css_path);
            }
            Err(e) => {
                // Style compile errors skip the file, never the batch
                outcome.failed += 1;
                logger::status_error(
                    &format!("style: {}", rel_display(file, &config.root)),
                    &format!("{e:#}"),
                );
            }
        }
    }

    log!(
        "style";
        "compiled {}{}",
        plural_count(outcome.written.len(), "stylesheet"),
        if outcome.failed > 0 {
            format!(" ({} failed)", outcome.failed)
        } else {
            String::new()
        }
    );

    Ok(outcome)
}

/// Partials (leading underscore) are only reachable through `@use`/`@import`.
fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}

/// Compile a single stylesheet. Returns the written CSS path.
fn compile_one(source: &Path, dest: &Path, style: &StyleConfig) -> Result<PathBuf> {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("invalid file name: {}", source.display()))?;
    let css_name = format!("{stem}.css");
    let map_name = format!("{stem}.css.map");

    let mut options = grass::Options::default().style(grass::OutputStyle::Expanded);
    if let Some(parent) = source.parent() {
        options = options.load_path(parent);
    }
    let compiled = grass::from_path(source, &options).map_err(|e| anyhow!("{e}"))?;

    let source_name = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(stem)
        .to_string();
    let (mut code, map) = transform_css(&compiled, &source_name, style)?;

    let css_path = dest.join(&css_name);
    if let Some(map_json) = map {
        code.push_str(&format!("\n/*# sourceMappingURL={map_name} */"));
        fs::write(dest.join(&map_name), map_json)
            .with_context(|| format!("failed to write {map_name}"))?;
    }
    fs::write(&css_path, code)
        .with_context(|| format!("failed to write {}", css_path.display()))?;

    Ok(css_path)
}

/// Vendor-prefix and minify compiled CSS, emitting a source map.
fn transform_css(
    css: &str,
    source_name: &str,
    style: &StyleConfig,
) -> Result<(String, Option<String>)> {
    let mut source_map = style.source_maps.then(|| SourceMap::new("/"));
    if let Some(map) = &mut source_map {
        map.add_source(source_name);
        // The map points at the compiled output of the named source; close
        // enough for devtools to show the rule origin
        let _ = map.set_source_content(0, css);
    }

    let stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: source_name.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("{e}"))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: style.minify,
            source_map: source_map.as_mut(),
            targets: Targets {
                browsers: Some(style.targets.to_browsers()),
                ..Targets::default()
            },
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let map_json = source_map.and_then(|mut map| map.to_json(None).ok());
    Ok((result.code, map_json))
}

/// Path of a written stylesheet as the dev server serves it
/// (e.g. `<root>/app/css/main.css` → `/css/main.css`).
fn served_href(css_path: &Path, serve_root: &Path) -> Option<String> {
    let rel = css_path.strip_prefix(serve_root).ok()?;
    let mut href = String::from("/");
    href.push_str(&rel.to_string_lossy().replace('\\', "/"));
    Some(href)
}
