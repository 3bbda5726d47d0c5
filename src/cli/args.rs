//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Gully asset pipeline CLI
///
/// Without a subcommand, runs the default task: style and html in parallel,
/// then the watch/serve loop.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: gully.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "gully.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available tasks
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile, prefix and minify stylesheets with source maps
    #[command(visible_alias = "s")]
    Style,

    /// Resolve build blocks in markup and minify referenced scripts
    Html,

    /// Start the dev server with live reload and file watching
    #[command(visible_alias = "w")]
    Watch,

    /// Recompress images (content-cached, lossless)
    #[command(visible_alias = "i")]
    Images,

    /// Copy fonts into the dist tree
    Fonts,

    /// Delete the dist tree
    #[command(name = "clean:dist", visible_alias = "clean")]
    Clean,

    /// Run style and html in parallel, then watch (same as no subcommand)
    Default,
}

#[allow(unused)]
impl Cli {
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Some(Commands::Watch))
    }
}
