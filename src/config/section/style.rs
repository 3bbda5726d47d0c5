//! `[style]` section configuration.
//!
//! Controls the style task: minification, source maps, and the browser
//! matrix used for vendor prefixing.
//!
//! # Example
//!
//! ```toml
//! [style]
//! minify = true
//! source_maps = true
//!
//! [style.targets]
//! chrome = "90"
//! safari = "14.1"
//! ```
//!
//! Versions are `major[.minor[.patch]]` strings. Setting a browser to the
//! empty string removes it from the matrix.

use lightningcss::targets::Browsers;
use serde::{Deserialize, Serialize};

/// Style task settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Minify compiled CSS.
    pub minify: bool,

    /// Emit a `.css.map` next to each compiled stylesheet.
    pub source_maps: bool,

    /// Browser matrix for vendor prefixing.
    pub targets: TargetsConfig,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            minify: true,
            source_maps: true,
            targets: TargetsConfig::default(),
        }
    }
}

/// Minimum browser versions to prefix for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    pub chrome: Option<String>,
    pub edge: Option<String>,
    pub firefox: Option<String>,
    pub safari: Option<String>,
    pub ios: Option<String>,
    pub android: Option<String>,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        // Roughly "browsers current two years ago", the usual prefix window
        Self {
            chrome: Some("90".into()),
            edge: Some("90".into()),
            firefox: Some("88".into()),
            safari: Some("14".into()),
            ios: Some("14".into()),
            android: None,
        }
    }
}

impl TargetsConfig {
    /// Convert to the lightningcss browser matrix.
    ///
    /// Unparseable versions are skipped rather than failing the task.
    pub fn to_browsers(&self) -> Browsers {
        Browsers {
            chrome: self.chrome.as_deref().and_then(parse_version),
            edge: self.edge.as_deref().and_then(parse_version),
            firefox: self.firefox.as_deref().and_then(parse_version),
            safari: self.safari.as_deref().and_then(parse_version),
            ios_saf: self.ios.as_deref().and_then(parse_version),
            android: self.android.as_deref().and_then(parse_version),
            ..Browsers::default()
        }
    }
}

/// Parse `major[.minor[.patch]]` into lightningcss's packed version format
/// (`major << 16 | minor << 8 | patch`).
fn parse_version(version: &str) -> Option<u32> {
    let mut parts = version.trim().splitn(3, '.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    let patch: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    Some((major << 16) | (minor << 8) | patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_parse_version_major_only() {
        assert_eq!(parse_version("90"), Some(90 << 16));
    }

    #[test]
    fn test_parse_version_major_minor() {
        assert_eq!(parse_version("14.4"), Some((14 << 16) | (4 << 8)));
    }

    #[test]
    fn test_parse_version_full() {
        assert_eq!(parse_version("1.2.3"), Some((1 << 16) | (2 << 8) | 3));
    }

    #[test]
    fn test_parse_version_invalid() {
        assert_eq!(parse_version("not-a-version"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn test_style_defaults() {
        let config = test_parse_config("");
        assert!(config.style.minify);
        assert!(config.style.source_maps);

        let browsers = config.style.targets.to_browsers();
        assert_eq!(browsers.chrome, Some(90 << 16));
        assert_eq!(browsers.android, None);
    }

    #[test]
    fn test_style_targets_override() {
        let config =
            test_parse_config("[style]\nminify = false\n[style.targets]\nsafari = \"15.4\"");
        assert!(!config.style.minify);
        assert_eq!(
            config.style.targets.to_browsers().safari,
            Some((15 << 16) | (4 << 8))
        );
    }
}
