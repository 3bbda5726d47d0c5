//! `[images]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [images]
//! png = true    # re-encode PNGs at maximum compression
//! svg = true    # strip SVG whitespace via reserialization
//! ```
//!
//! JPEG and GIF sources are copied through unchanged: there is no lossless
//! recompressor for them in the stack.

use serde::{Deserialize, Serialize};

/// Image task settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Re-encode PNG files losslessly at maximum compression.
    pub png: bool,

    /// Reserialize SVG files without indentation.
    pub svg: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            png: true,
            svg: true,
        }
    }
}
