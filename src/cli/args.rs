//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

use crate::compiler::CompilerCommand;

/// Live-coding server: recompiles an Elm program on save and pushes it to the browser
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Elm program to watch (must end in .elm)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// HTTP service address (`:port` listens on all interfaces)
    #[arg(short, long, default_value = ":8080")]
    pub addr: String,

    /// Compiler command; `{input}` and `{output}` are replaced with file paths
    #[arg(long, value_name = "TEMPLATE", default_value = CompilerCommand::DEFAULT_TEMPLATE)]
    pub compiler: String,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
