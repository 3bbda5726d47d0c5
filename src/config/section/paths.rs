//! `[paths]` section configuration.
//!
//! The path table maps each asset class to a source glob and a destination
//! directory. It is the only persistent entity in the pipeline: built once at
//! startup, immutable afterwards.
//!
//! # Example
//!
//! ```toml
//! [paths.styles]
//! src = "app/scss/*.scss"
//! dest = "app/css"
//!
//! [paths.fonts]
//! src = "app/fonts/**/*"
//! dest = "dist/fonts"
//! ```
//!
//! Globs are relative to the project root. One `{a,b,c}` alternative group is
//! supported per pattern (expanded before matching, see `utils::glob`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A source glob / destination directory pair for one asset class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathPair {
    /// Source glob, relative to the project root.
    pub src: String,
    /// Destination directory, relative to the project root.
    pub dest: PathBuf,
}

impl PathPair {
    fn new(src: &str, dest: &str) -> Self {
        Self {
            src: src.to_string(),
            dest: PathBuf::from(dest),
        }
    }
}

/// Asset-class path table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Stylesheet sources. Partials (leading underscore) are never compiled
    /// directly, only pulled in through `@use`/`@import`.
    pub styles: PathPair,

    /// Markup pages with build blocks to resolve.
    pub markup: PathPair,

    /// Script sources. Watched for reload only - scripts reach dist through
    /// markup build blocks, not through a task of their own.
    pub scripts: PathPair,

    /// Image sources, recompressed in place by default.
    pub images: PathPair,

    /// Font files, copied verbatim.
    pub fonts: PathPair,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            styles: PathPair::new("app/scss/*.scss", "app/css"),
            markup: PathPair::new("app/*.html", "dist"),
            scripts: PathPair::new("app/js/**/*.js", "app"),
            images: PathPair::new("app/images/**/*.{png,jpg,jpeg,gif,svg}", "app/images"),
            fonts: PathPair::new("app/fonts/**/*", "dist/fonts"),
        }
    }
}
