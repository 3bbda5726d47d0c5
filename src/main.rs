//! Gully - an asset pipeline and dev server for static web apps.

mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod freshness;
mod logger;
mod reload;
mod task;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{PipelineConfig, init_config};
use reload::ReloadHub;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    logger::set_verbose(cli.verbose);

    let config = init_config(PipelineConfig::load(cli)?);

    match cli.command.clone().unwrap_or(Commands::Default) {
        Commands::Style => task::style::run(&config, &ReloadHub::new()).map(|_| ()),
        Commands::Html => task::markup::run(&config, &ReloadHub::new()).map(|_| ()),
        Commands::Images => task::images::run(&config).map(|_| ()),
        Commands::Fonts => task::fonts::run(&config).map(|_| ()),
        Commands::Clean => task::clean::run(&config),
        Commands::Watch => serve_and_watch(&config, &ReloadHub::new()),
        Commands::Default => build_and_watch(&config),
    }
}

// =============================================================================
// Watch Command
// =============================================================================

/// Bind the dev server, start the reload channel and the file watcher, then
/// block on the request loop until Ctrl+C.
fn serve_and_watch(config: &PipelineConfig, hub: &ReloadHub) -> Result<()> {
    let bound = cli::serve::bind_server(config)?;

    let ws_port = reload::start_reload_server(hub.clone(), reload::DEFAULT_WS_PORT)?;
    cli::serve::set_actual_ws_port(ws_port);
    debug!("reload"; "ws://localhost:{}", ws_port);

    let (shutdown_tx, shutdown_rx) = crossbeam::channel::unbounded::<()>();
    core::register_server(bound.server(), shutdown_tx);

    let watcher = if config.serve.watch {
        Some(watch::spawn_watcher(config::cfg(), hub.clone(), shutdown_rx)?)
    } else {
        None
    };

    bound.run()?;
    watch::wait_for_shutdown(watcher);
    Ok(())
}

// =============================================================================
// Default Task
// =============================================================================

/// Run the style and markup tasks in parallel, then enter the watch loop.
///
/// The reload hub is created up front and shared with both tasks, so their
/// completion notifications land on the same channel the watcher uses.
fn build_and_watch(config: &PipelineConfig) -> Result<()> {
    let hub = ReloadHub::new();

    let (style_result, markup_result) = rayon::join(
        || task::style::run(config, &hub),
        || task::markup::run(config, &hub),
    );

    style_result?;
    markup_result?;

    serve_and_watch(config, &hub)
}
