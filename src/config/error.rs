//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("need an .{expected} program, got `{}`", path.display())]
    NotSource { path: PathBuf, expected: &'static str },

    #[error("invalid address `{addr}`: {reason}")]
    Address { addr: String, reason: String },

    #[error("compiler command is empty")]
    EmptyCompiler,
}
