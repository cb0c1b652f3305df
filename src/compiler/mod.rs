//! Build invocation.
//!
//! The compiler is an external program: it takes a source path and an output
//! path, and either writes the artifact or prints diagnostics. [`Compiler`]
//! is the seam between the poller and that program, so tests can swap in a
//! stub without spawning anything.

mod command;

use std::fmt;
use std::path::{Path, PathBuf};

pub use command::{CommandCompiler, CompilerCommand};

/// Extension of the watched source file.
pub const SOURCE_EXT: &str = "elm";

/// Extension of the compiled artifact written next to the source.
pub const ARTIFACT_EXT: &str = "js";

/// Compiler output explaining why a build produced no artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic(String);

impl Diagnostic {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns a source file into an artifact on disk.
///
/// `compile` blocks until the build finishes. On `Ok` the artifact is at
/// `output`; on `Err` nothing is guaranteed about `output` (a stale artifact
/// from an earlier build may remain).
pub trait Compiler: Send + Sync {
    fn compile(&self, source: &Path, output: &Path) -> Result<(), Diagnostic>;
}

impl<F> Compiler for F
where
    F: Fn(&Path, &Path) -> Result<(), Diagnostic> + Send + Sync,
{
    fn compile(&self, source: &Path, output: &Path) -> Result<(), Diagnostic> {
        self(source, output)
    }
}

/// Artifact path for a source file: `src/Main.elm` -> `src/Main.js`.
pub fn output_path_for(source: &Path) -> PathBuf {
    source.with_extension(ARTIFACT_EXT)
}

/// Whether `path` names a source file the compiler accepts.
pub fn is_source_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("src/Main.elm")),
            PathBuf::from("src/Main.js")
        );
        assert_eq!(
            output_path_for(Path::new("/abs/app.v2.elm")),
            PathBuf::from("/abs/app.v2.js")
        );
    }

    #[test]
    fn test_is_source_file() {
        assert!(is_source_file(Path::new("Main.elm")));
        assert!(is_source_file(Path::new("dir/Main.elm")));
        assert!(!is_source_file(Path::new("Main.js")));
        assert!(!is_source_file(Path::new("elm")));
        assert!(!is_source_file(Path::new("Main.elm.bak")));
    }

    #[test]
    fn test_closure_compiler() {
        let failing = |_: &Path, _: &Path| -> Result<(), Diagnostic> {
            Err(Diagnostic::new("-- SYNTAX PROBLEM --"))
        };
        let err = failing
            .compile(Path::new("Main.elm"), Path::new("Main.js"))
            .unwrap_err();
        assert_eq!(err.as_str(), "-- SYNTAX PROBLEM --");
    }
}
