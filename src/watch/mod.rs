//! File watching for the dev server.
//!
//! Watches the style, script and markup roots from the path table and turns
//! debounced change batches into pipeline work:
//!
//! ```text
//! notify → Debouncer (timing + dedup) → classify → style rerun / reload push
//! ```
//!
//! Style changes re-run the style task (clients get CSS refresh messages);
//! script and markup changes push a full-reload notification.

mod debouncer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, unbounded};
use glob::Pattern;
use notify::{RecursiveMode, Watcher};

use crate::config::PipelineConfig;
use crate::logger;
use crate::reload::{ReloadHub, ReloadMessage};
use crate::task;
use crate::utils::glob::{compile_pattern, is_recursive, matches};
use crate::utils::path::normalize_path;
use crate::{debug, log};

use debouncer::Debouncer;

/// Compiled matchers for change classification.
struct ChangeClassifier {
    styles_root: PathBuf,
    scripts: Vec<Pattern>,
    markup: Vec<Pattern>,
}

impl ChangeClassifier {
    fn new(config: &PipelineConfig) -> Result<Self> {
        let root = normalize_path(&config.root);

        let compile = |src: &str| -> Result<Vec<Pattern>> {
            let absolute = root.join(src).to_string_lossy().into_owned();
            compile_pattern(&absolute)
                .with_context(|| format!("invalid source glob '{src}'"))
        };

        Ok(Self {
            styles_root: root.join(crate::utils::glob::static_prefix(&config.paths.styles.src)),
            scripts: compile(&config.paths.scripts.src)?,
            markup: compile(&config.paths.markup.src)?,
        })
    }

    /// Style sources include partials, which the source glob never matches;
    /// anything under the styles root counts.
    fn is_style(&self, path: &Path) -> bool {
        path.starts_with(&self.styles_root)
    }

    fn is_script(&self, path: &Path) -> bool {
        matches(&self.scripts, path)
    }

    fn is_markup(&self, path: &Path) -> bool {
        matches(&self.markup, path)
    }
}

/// Spawn the watcher thread.
///
/// The watcher starts before the initial request arrives, so changes made
/// while the server is coming up are buffered rather than lost.
pub fn spawn_watcher(
    config: Arc<PipelineConfig>,
    hub: ReloadHub,
    shutdown_rx: Receiver<()>,
) -> Result<JoinHandle<()>> {
    let classifier = ChangeClassifier::new(&config)?;

    // Bridge notify's callback into a channel the loop can select on
    let (notify_tx, notify_rx) = unbounded::<notify::Event>();
    let mut watcher = notify::recommended_watcher(move |res| match res {
        Ok(event) => {
            let _ = notify_tx.send(event);
        }
        Err(e) => crate::log!("watch"; "notify error: {}", e),
    })?;

    let mode_for = |src: &str| {
        if is_recursive(src) {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        }
    };

    let root = normalize_path(&config.root);
    let roots = [
        // Styles watch recursively regardless of the glob: partials in
        // subdirectories must trigger a recompile too
        (&config.paths.styles, RecursiveMode::Recursive),
        (&config.paths.scripts, mode_for(&config.paths.scripts.src)),
        (&config.paths.markup, mode_for(&config.paths.markup.src)),
    ];
    for (pair, mode) in roots {
        let watch_root = root.join(crate::utils::glob::static_prefix(&pair.src));
        if !watch_root.exists() {
            debug!("watch"; "skipping missing root: {}", watch_root.display());
            continue;
        }
        watcher
            .watch(&watch_root, mode)
            .with_context(|| format!("failed to watch {}", watch_root.display()))?;
        debug!("watch"; "watching {}", watch_root.display());
    }

    log!("watch"; "watching for changes (Ctrl+C to stop)");

    let handle = std::thread::spawn(move || {
        // Keep the watcher alive for the lifetime of the loop
        let _watcher = watcher;
        run_event_loop(&config, &hub, &classifier, &notify_rx, &shutdown_rx);
    });

    Ok(handle)
}

fn run_event_loop(
    config: &PipelineConfig,
    hub: &ReloadHub,
    classifier: &ChangeClassifier,
    notify_rx: &Receiver<notify::Event>,
    shutdown_rx: &Receiver<()>,
) {
    let mut debouncer = Debouncer::new();

    loop {
        crossbeam::select! {
            recv(notify_rx) -> msg => match msg {
                Ok(event) => debouncer.add_event(&event),
                Err(_) => break, // watcher dropped
            },
            recv(shutdown_rx) -> _ => break,
            default(debouncer.sleep_duration()) => {
                if let Some(changes) = debouncer.take_if_ready() {
                    handle_changes(changes.keys(), config, hub, classifier);
                }
            }
        }
    }

    debug!("watch"; "watcher stopped");
}

/// Turn a debounced change batch into pipeline work.
fn handle_changes<'a>(
    paths: impl Iterator<Item = &'a PathBuf>,
    config: &PipelineConfig,
    hub: &ReloadHub,
    classifier: &ChangeClassifier,
) {
    let mut style_changed = false;
    let mut reload_reason: Option<&'static str> = None;

    for path in paths {
        if classifier.is_style(path) {
            style_changed = true;
        } else if classifier.is_script(path) {
            reload_reason = Some("scripts changed");
        } else if classifier.is_markup(path) {
            // Scripts take precedence in the reason string only; both push
            // the same full reload
            reload_reason.get_or_insert("markup changed");
        }
    }

    if style_changed {
        match task::style::run(config, hub) {
            Ok(outcome) if outcome.failed == 0 => {
                logger::status_success(&crate::utils::plural::plural_count(
                    outcome.written.len(),
                    "stylesheet",
                ));
            }
            // Per-file errors were already displayed by the task
            Ok(_) => {}
            Err(e) => logger::status_error("style task failed", &format!("{e:#}")),
        }
    }

    if let Some(reason) = reload_reason {
        hub.broadcast(&ReloadMessage::reload(reason));
        logger::status_success(reason);
    }
}

/// Wait for the watcher thread to stop after shutdown (max 2 seconds).
pub fn wait_for_shutdown(handle: Option<JoinHandle<()>>) {
    let Some(handle) = handle else { return };

    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
}
