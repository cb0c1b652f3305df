//! External command execution utilities.
//!
//! Provides a Builder-based API for running the compiler subprocess and
//! collecting everything it printed.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::new("elm-make")
//!     .args(["Main.elm", "--yes", "--output=Main.js"])
//!     .run()?;
//! if !output.success {
//!     eprintln!("{}", output.combined);
//! }
//! ```

use anyhow::{Context, Result};
use std::{
    ffi::{OsStr, OsString},
    io::{self, Read},
    process::{Command, Stdio},
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
}

/// Exit status plus stdout and stderr interleaved in the order written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedOutput {
    pub success: bool,
    pub combined: String,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Get the program name for error messages.
    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Execute the command and wait for it, without a timeout.
    ///
    /// Both stdout and stderr go to one pipe, so the text keeps the order
    /// the process wrote it in. A non-zero exit is not an error here: it is
    /// reported through [`CombinedOutput::success`]. Only a failure to spawn
    /// or wait is.
    pub fn run(self) -> Result<CombinedOutput> {
        let name = self.program_name();
        let (mut reader, writer) = io::pipe().context("Failed to create output pipe")?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to execute `{name}`"))?;
        // release our copies of the write end, or the read never sees EOF
        drop(cmd);

        let mut output = Vec::new();
        let read = reader.read_to_end(&mut output);
        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for `{name}`"))?;
        read.with_context(|| format!("Failed to read output of `{name}`"))?;

        Ok(CombinedOutput {
            success: status.success(),
            combined: String::from_utf8_lossy(&output).into_owned(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("elm-make")
            .arg("Main.elm")
            .args(["--yes", "--output=Main.js"]);

        assert_eq!(cmd.program, OsString::from("elm-make"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.program_name(), "elm-make");
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("echo").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_simple_command() {
        let output = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(output.success);
        assert_eq!(output.combined, "hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_keeps_both_streams() {
        let output = Cmd::new("sh")
            .args(["-c", "echo out; echo err >&2; exit 3"])
            .run()
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.combined, "out\nerr\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_streams_interleave_in_write_order() {
        let output = Cmd::new("sh")
            .args(["-c", "echo a; echo b >&2; echo c"])
            .run()
            .unwrap();
        assert!(output.success);
        assert_eq!(output.combined, "a\nb\nc\n");
    }

    #[test]
    fn test_missing_program() {
        let err = Cmd::new("livecode-no-such-program").run().unwrap_err();
        assert!(err.to_string().contains("livecode-no-such-program"));
    }
}
