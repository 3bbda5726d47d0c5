//! Clean task: delete the dist tree.

use std::fs;

use anyhow::{Context, Result};

use crate::config::PipelineConfig;
use crate::log;
use crate::utils::path::rel_display;

/// Run the clean task. The dist root is the markup destination.
pub fn run(config: &PipelineConfig) -> Result<()> {
    let dist = config.dest_for(&config.paths.markup);

    if dist.exists() {
        fs::remove_dir_all(&dist)
            .with_context(|| format!("failed to remove {}", dist.display()))?;
        log!("clean"; "removed {}", rel_display(&dist, &config.root));
    } else {
        log!("clean"; "nothing to remove");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use tempfile::TempDir;

    #[test]
    fn test_clean_removes_dist_entirely() {
        let dir = TempDir::new().unwrap();
        let dist = dir.path().join("dist");
        fs::create_dir_all(dist.join("js")).unwrap();
        fs::write(dist.join("index.html"), "<html></html>").unwrap();
        fs::write(dist.join("js/main.min.js"), "x()").unwrap();

        let mut config = PipelineConfig::default();
        config.root = dir.path().to_path_buf();

        run(&config).unwrap();
        assert!(!dist.exists());
    }

    #[test]
    fn test_clean_missing_dist_is_fine() {
        let dir = TempDir::new().unwrap();
        let mut config = PipelineConfig::default();
        config.root = dir.path().to_path_buf();

        assert!(run(&config).is_ok());
    }

    #[test]
    fn test_clean_leaves_app_alone() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("app")).unwrap();
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("app/index.html"), "source").unwrap();

        let mut config = PipelineConfig::default();
        config.root = dir.path().to_path_buf();

        run(&config).unwrap();
        assert!(dir.path().join("app/index.html").exists());
    }
}
