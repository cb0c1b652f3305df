//! Compiler invoked as a subprocess.

use std::path::Path;

use super::{Compiler, Diagnostic};
use crate::utils::exec::Cmd;

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Command line template for the compiler.
///
/// `{input}` and `{output}` inside arguments are replaced with the source and
/// artifact paths on every build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for CompilerCommand {
    fn default() -> Self {
        Self::parse(Self::DEFAULT_TEMPLATE).unwrap_or_else(|| Self {
            program: "elm-make".into(),
            args: Vec::new(),
        })
    }
}

impl CompilerCommand {
    pub const DEFAULT_TEMPLATE: &'static str = "elm-make {input} --yes --output={output}";

    /// Split a template on whitespace. `None` if it is blank.
    pub fn parse(template: &str) -> Option<Self> {
        let mut parts = template.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Arguments with placeholders filled in.
    pub fn expand(&self, source: &Path, output: &Path) -> Vec<String> {
        let source = source.to_string_lossy();
        let output = output.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(INPUT_PLACEHOLDER, &source)
                    .replace(OUTPUT_PLACEHOLDER, &output)
            })
            .collect()
    }
}

/// Runs [`CompilerCommand`] and reports its combined output on failure.
#[derive(Debug, Clone, Default)]
pub struct CommandCompiler {
    command: CompilerCommand,
}

impl CommandCompiler {
    pub fn new(command: CompilerCommand) -> Self {
        Self { command }
    }
}

impl Compiler for CommandCompiler {
    fn compile(&self, source: &Path, output: &Path) -> Result<(), Diagnostic> {
        let cmd = Cmd::new(&self.command.program).args(self.command.expand(source, output));
        let name = cmd.program_name();

        crate::debug!("compile"; "running `{}` on {}", name, source.display());

        match cmd.run() {
            Ok(out) if out.success => Ok(()),
            Ok(out) if out.combined.trim().is_empty() => {
                Err(Diagnostic::new(format!("`{name}` failed without output")))
            }
            Ok(out) => Err(Diagnostic::new(out.combined)),
            Err(e) => Err(Diagnostic::new(format!("{e:#}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn command(program: &str, args: &[&str]) -> CompilerCommand {
        CompilerCommand {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_default_template() {
        let cmd = CompilerCommand::default();
        assert_eq!(cmd.program, "elm-make");
        assert_eq!(
            cmd.expand(Path::new("Main.elm"), Path::new("Main.js")),
            vec!["Main.elm", "--yes", "--output=Main.js"]
        );
    }

    #[test]
    fn test_parse_blank() {
        assert_eq!(CompilerCommand::parse("   "), None);
        assert_eq!(
            CompilerCommand::parse("  cp {input}  {output} "),
            Some(command("cp", &["{input}", "{output}"]))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_build_writes_artifact() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("Main.elm");
        let output: PathBuf = dir.path().join("Main.js");
        fs::write(&source, "console.log('hi')").unwrap();

        let compiler = CommandCompiler::new(command("cp", &["{input}", "{output}"]));
        compiler.compile(&source, &output).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "console.log('hi')");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_build_returns_combined_output() {
        let compiler = CommandCompiler::new(command(
            "sh",
            &["-c", "echo '-- TYPE MISMATCH --'; echo 'in {input}' >&2; exit 1"],
        ));
        let err = compiler
            .compile(Path::new("Main.elm"), Path::new("Main.js"))
            .unwrap_err();
        assert_eq!(err.as_str(), "-- TYPE MISMATCH --\nin Main.elm\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_silent_failure_still_diagnosed() {
        let compiler = CommandCompiler::new(command("false", &[]));
        let err = compiler
            .compile(Path::new("Main.elm"), Path::new("Main.js"))
            .unwrap_err();
        assert!(err.as_str().contains("failed without output"));
    }

    #[test]
    fn test_missing_compiler_is_a_diagnostic() {
        let compiler = CommandCompiler::new(command("livecode-missing-compiler", &["{input}"]));
        let err = compiler
            .compile(Path::new("Main.elm"), Path::new("Main.js"))
            .unwrap_err();
        assert!(err.as_str().contains("livecode-missing-compiler"));
    }
}
