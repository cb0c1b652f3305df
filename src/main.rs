//! livecode - live-coding server for a single Elm program.

mod cli;
mod compiler;
mod config;
mod core;
mod embed;
mod freshness;
mod logger;
mod reload;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use compiler::CommandCompiler;
use config::ServeConfig;
use reload::poller::ChangePoller;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(ServeConfig::from_cli(&cli)?);
    check_compiler(&config);

    let compiler = Arc::new(CommandCompiler::new(config.compiler.clone()));
    let poller = Arc::new(ChangePoller::new(&config.source, compiler));
    debug!("serve"; "artifact at {}", poller.output().display());

    cli::serve::bind_server(config, poller)?.run()
}

/// Warn early if the compiler is not on PATH. Not fatal: it may be
/// installed while the server runs, and every build reports its own failure.
fn check_compiler(config: &ServeConfig) {
    let program = &config.compiler.program;
    if which::which(program).is_err() {
        log!("compile"; "warning: `{}` not found in PATH", program);
    }
}
