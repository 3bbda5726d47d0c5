//! Pipeline configuration management for `gully.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── paths      # [paths] asset-class path table
//! │   ├── serve      # [serve]
//! │   ├── style      # [style] and [style.targets]
//! │   └── images     # [images]
//! ├── error          # ConfigError
//! ├── handle         # Global config handle
//! └── mod.rs         # PipelineConfig (this file)
//! ```
//!
//! The config file is optional: a missing `gully.toml` yields the default
//! path table, which matches the conventional `app/` → `dist/` layout.

mod error;
mod handle;
pub mod section;

pub use error::ConfigError;
pub use handle::{cfg, init_config};
pub use section::{ImagesConfig, PathPair, PathsConfig, ServeConfig, StyleConfig};

use crate::cli::Cli;
use crate::debug;
use crate::utils::glob::compile_pattern;
use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing gully.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Asset-class path table
    pub paths: PathsConfig,

    /// Development server settings
    pub serve: ServeConfig,

    /// Style task settings
    pub style: StyleConfig,

    /// Image task settings
    pub images: ImagesConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            paths: PathsConfig::default(),
            serve: ServeConfig::default(),
            style: StyleConfig::default(),
            images: ImagesConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file; the project root is
    /// the config file's parent directory. A missing config file is not an
    /// error - the defaults describe the conventional app/dist layout and the
    /// root is the current directory.
    pub fn load(cli: &'static Cli) -> Result<Self, ConfigError> {
        let config = match find_config_file(&cli.config) {
            Some(path) => Self::from_path(&path)?,
            None => {
                debug!("config"; "no {} found, using defaults", cli.config.display());
                let mut config = Self::default();
                config.root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                config.config_path = config.root.join(&cli.config);
                config
            }
        };

        config.validate_patterns()?;
        Ok(config)
    }

    /// Parse configuration from a file on disk.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;

        config.config_path = path.to_path_buf();
        config.root = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(config)
    }

    /// Check every source glob in the path table up front, so a typo fails
    /// at startup instead of mid-task.
    fn validate_patterns(&self) -> Result<(), ConfigError> {
        for pair in [
            &self.paths.styles,
            &self.paths.markup,
            &self.paths.scripts,
            &self.paths.images,
            &self.paths.fonts,
        ] {
            compile_pattern(&pair.src).map_err(|e| ConfigError::Pattern {
                pattern: pair.src.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // path helpers
    // ------------------------------------------------------------------------

    /// Absolute source glob for an asset class.
    pub fn glob_for(&self, pair: &PathPair) -> String {
        self.root.join(&pair.src).to_string_lossy().into_owned()
    }

    /// Absolute destination directory for an asset class.
    pub fn dest_for(&self, pair: &PathPair) -> PathBuf {
        self.root.join(&pair.dest)
    }

    /// Absolute static prefix of an asset class's source glob
    /// (e.g. `app/images/**/*` → `<root>/app/images`).
    pub fn src_root_for(&self, pair: &PathPair) -> PathBuf {
        self.root
            .join(crate::utils::glob::static_prefix(&pair.src))
    }

    /// Directory the dev server serves from.
    pub fn serve_root(&self) -> PathBuf {
        self.root.join(&self.serve.root)
    }

    /// Directory for persisted pipeline state (image cache manifest).
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(".gully")
    }
}

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    // First check if config_name is an absolute path
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    // Walk up from cwd looking for config file
    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
pub(crate) fn test_parse_config(content: &str) -> PipelineConfig {
    toml::from_str(content).expect("test config should parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.paths.styles.src, "app/scss/*.scss");
        assert_eq!(config.serve.port, 3000);
        assert!(config.style.minify);
    }

    #[test]
    fn test_glob_for_joins_root() {
        let mut config = PipelineConfig::default();
        config.root = PathBuf::from("/project");
        assert_eq!(
            config.glob_for(&config.paths.styles),
            "/project/app/scss/*.scss"
        );
        assert_eq!(config.dest_for(&config.paths.styles), PathBuf::from("/project/app/css"));
    }

    #[test]
    fn test_src_root_strips_glob_components() {
        let mut config = PipelineConfig::default();
        config.root = PathBuf::from("/project");
        assert_eq!(
            config.src_root_for(&config.paths.images),
            PathBuf::from("/project/app/images")
        );
        assert_eq!(
            config.src_root_for(&config.paths.markup),
            PathBuf::from("/project/app")
        );
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut config = PipelineConfig::default();
        config.paths.styles.src = "app/[".into();
        assert!(config.validate_patterns().is_err());
    }
}
