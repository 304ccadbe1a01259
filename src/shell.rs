//! Shell pipeline builder and executor.
use std::process::{Command, Stdio};

use tracing::{debug, error};

use crate::{
    constants::{DEFAULT_SHELL, PIPE_SEPARATOR, SHELL_COMMAND_FLAG},
    error::ConsoleError,
};

/// Quotes `word` for a POSIX shell.
pub fn shell_quote(word: &str) -> String {
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// One program and its arguments inside a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandStage {
    program: String,
    args: Vec<String>,
}

impl CommandStage {
    fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Appends an argument; empty arguments are ignored.
    pub fn arg(&mut self, arg: impl AsRef<str>) -> &mut Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_string());
        }
        self
    }

    /// Appends each non-empty argument.
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    /// The stage as quoted shell words.
    pub fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|word| shell_quote(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of running a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    /// Exit code of the shell; `None` when it was killed by a signal.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ShellOutput {
    /// Standard output split into lines, without a trailing empty line.
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Builds a pipeline of commands and runs it through `sh -c`.
///
/// ```no_run
/// # use consolekit::shell::ShellCommand;
/// let mut shell = ShellCommand::new();
/// shell.add_command("ls").arg("-la");
/// shell.add_command("grep").arg(".rs");
/// let output = shell.exec()?;
/// # Ok::<(), consolekit::error::ConsoleError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShellCommand {
    stages: Vec<CommandStage>,
}

impl ShellCommand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all stages.
    pub fn reset(&mut self) {
        self.stages.clear();
    }

    /// Appends a pipeline stage running `program`.
    pub fn add_command(&mut self, program: &str) -> &mut CommandStage {
        self.stages.push(CommandStage::new(program));
        let last = self.stages.len() - 1;
        &mut self.stages[last]
    }

    /// Appends `arg` to the stage at `index`; `None` when there is no such stage.
    pub fn add_param(&mut self, index: usize, arg: &str) -> Option<&mut CommandStage> {
        let stage = self.stages.get_mut(index)?;
        stage.arg(arg);
        Some(stage)
    }

    pub fn stages(&self) -> &[CommandStage] {
        &self.stages
    }

    /// The full pipeline as a shell command line.
    pub fn command_line(&self) -> String {
        self.stages
            .iter()
            .map(CommandStage::command_line)
            .collect::<Vec<_>>()
            .join(PIPE_SEPARATOR)
    }

    /// Runs the pipeline and captures its output.
    pub fn exec(&self) -> Result<ShellOutput, ConsoleError> {
        let command_line = self.command_line();
        debug!("Executing command: {command_line}");

        let output = Command::new(DEFAULT_SHELL)
            .arg(SHELL_COMMAND_FLAG)
            .arg(&command_line)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| {
                error!("Error executing command '{command_line}': {source}");
                ConsoleError::Shell {
                    command: command_line.clone(),
                    source,
                }
            })?;

        let result = ShellOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!("Command finished with status {:?}", result.status);
        Ok(result)
    }
}
