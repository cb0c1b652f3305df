//! Server configuration.
//!
//! Built once from the command line and shared read-only:
//!
//! ```text
//! Cli ──from_cli──► ServeConfig ──Arc──► listener, sessions
//! ```
//!
//! Nothing here changes after startup, so there is no global handle and no
//! reload path.

mod error;

pub use error::ConfigError;

use std::net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::compiler::{self, CompilerCommand, SOURCE_EXT};
use crate::reload::session::SessionTimings;

/// Everything the server needs to run.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Watched source file, as given on the command line
    pub source: PathBuf,
    /// Address to listen on
    pub addr: SocketAddr,
    /// Compiler command line
    pub compiler: CompilerCommand,
    /// Session timers and limits
    pub timings: SessionTimings,
}

impl ServeConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        validate_source(&cli.file)?;

        Ok(Self {
            source: cli.file.clone(),
            addr: parse_addr(&cli.addr)?,
            compiler: CompilerCommand::parse(&cli.compiler).ok_or(ConfigError::EmptyCompiler)?,
            timings: SessionTimings::default(),
        })
    }
}

fn validate_source(path: &Path) -> Result<(), ConfigError> {
    if compiler::is_source_file(path) {
        Ok(())
    } else {
        Err(ConfigError::NotSource {
            path: path.to_path_buf(),
            expected: SOURCE_EXT,
        })
    }
}

/// Parse a listen address.
///
/// `:port` listens on all interfaces. `host:port` accepts names as well as
/// IP literals.
pub fn parse_addr(addr: &str) -> Result<SocketAddr, ConfigError> {
    let invalid = |reason: String| ConfigError::Address {
        addr: addr.to_string(),
        reason,
    };

    if let Some(port) = addr.strip_prefix(':') {
        let port: u16 = port.parse().map_err(|e| invalid(format!("bad port: {e}")))?;
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }

    if let Ok(addr) = addr.parse::<SocketAddr>() {
        return Ok(addr);
    }

    addr.to_socket_addrs()
        .map_err(|e| invalid(e.to_string()))?
        .next()
        .ok_or_else(|| invalid("no addresses found".into()))
}
