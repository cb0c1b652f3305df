//! Change detection for the watched source file.
//!
//! There is no filesystem event source here: callers poll on a fixed
//! interval and pass in the last modification time they have already seen.
//! A change triggers exactly one build; a build that fails still consumes the
//! change, so a broken file is not rebuilt on every tick.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::compiler::{Compiler, Diagnostic, output_path_for};
use crate::freshness::ModTime;
use crate::logger;

/// What one poll produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildResult {
    /// The file changed and the build succeeded.
    Artifact(Vec<u8>),
    /// The file changed but the compiler rejected it.
    Diagnostic(Diagnostic),
    /// The file has not changed since the given timestamp.
    Unchanged,
}

/// Filesystem failures while polling. The text goes to the browser verbatim.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("stat {}: {source}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of [`ChangePoller::check_and_build`].
///
/// `mod_time` is what the caller should remember for the next poll. It
/// advances on every detected change, including failed builds and
/// unreadable artifacts.
#[derive(Debug)]
pub struct Poll {
    pub mod_time: ModTime,
    pub result: Result<BuildResult, PollError>,
}

/// Polls one source file and rebuilds it when its mtime moves forward.
///
/// Holds no per-caller state: every session passes its own timestamp, so
/// one poller is shared by all sessions.
pub struct ChangePoller {
    source: PathBuf,
    output: PathBuf,
    compiler: Arc<dyn Compiler>,
}

impl ChangePoller {
    pub fn new(source: impl Into<PathBuf>, compiler: Arc<dyn Compiler>) -> Self {
        let source = source.into();
        let output = output_path_for(&source);
        Self {
            source,
            output,
            compiler,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Stat the source and rebuild if it is strictly newer than `last_mod`.
    pub fn check_and_build(&self, last_mod: ModTime) -> Poll {
        let mod_time = match ModTime::of(&self.source) {
            Ok(t) => t,
            Err(source) => {
                return Poll {
                    mod_time: last_mod,
                    result: Err(PollError::Stat {
                        path: self.source.clone(),
                        source,
                    }),
                };
            }
        };

        if !mod_time.is_after(last_mod) {
            return Poll {
                mod_time: last_mod,
                result: Ok(BuildResult::Unchanged),
            };
        }

        let name = self.source.display();
        if let Err(diagnostic) = self.compiler.compile(&self.source, &self.output) {
            logger::status_error(&format!("compile error in {name}"), diagnostic.as_str());
            return Poll {
                mod_time,
                result: Ok(BuildResult::Diagnostic(diagnostic)),
            };
        }

        logger::status_success(&format!("compiled {name}, reloading"));

        let result = fs::read(&self.output)
            .map(BuildResult::Artifact)
            .map_err(|source| PollError::Read {
                path: self.output.clone(),
                source,
            });
        Poll { mod_time, result }
    }
}
