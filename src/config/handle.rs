//! Global config with atomic access.
//!
//! Uses `arc-swap` for lock-free reads: the watcher thread and the request
//! loop read the path table concurrently while tasks run.

use crate::config::PipelineConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
static CONFIG: LazyLock<ArcSwap<PipelineConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(PipelineConfig::default()));

#[inline]
pub fn cfg() -> Arc<PipelineConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: PipelineConfig) -> Arc<PipelineConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
