//! External command invocation
//!
//! Every collaborator the pipeline drives (git, gpg, svn, the build and site
//! tasks, precondition probes) goes through [`ToolCommand`]. Commands are
//! argument vectors, never shell strings, so nothing is re-parsed by a shell.
//! Each invocation blocks until the child exits; there is no timeout.

use crate::core::error::{StageError, StageResult, ToolError};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};
use tracing::debug;

/// A single external command invocation
#[derive(Debug, Clone)]
pub struct ToolCommand {
  program: String,
  args: Vec<String>,
  cwd: Option<PathBuf>,
  stdin: Option<String>,
}

impl ToolCommand {
  /// Create a command for a program with no arguments
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      stdin: None,
    }
  }

  /// Create a command from a configured argument vector (`["rake", "package"]`)
  pub fn from_argv(argv: &[String]) -> StageResult<Self> {
    let (program, args) = argv
      .split_first()
      .ok_or_else(|| StageError::message("Configured command is empty"))?;
    Ok(Self::new(program.clone()).args(args.iter().cloned()))
  }

  /// Append an argument
  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  /// Append several arguments
  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Run the command in a specific directory
  pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.cwd = Some(dir.as_ref().to_path_buf());
    self
  }

  /// Feed text to the command's stdin (never shown in `display()`)
  pub fn stdin_input(mut self, input: impl Into<String>) -> Self {
    self.stdin = Some(input.into());
    self
  }

  /// Arguments as configured
  #[allow(dead_code)] // Used by tests to inspect constructed commands
  pub fn arguments(&self) -> &[String] {
    &self.args
  }

  /// Human-readable command line for logs and error messages
  pub fn display(&self) -> String {
    std::iter::once(self.program.as_str())
      .chain(self.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }

  fn build(&self) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd.args(&self.args);
    if let Some(ref dir) = self.cwd {
      cmd.current_dir(dir);
    }
    cmd
  }

  fn launch_failed(&self, err: std::io::Error) -> StageError {
    StageError::Tool(ToolError::LaunchFailed {
      command: self.display(),
      reason: err.to_string(),
    })
  }

  /// Run with captured output; a non-zero exit is NOT an error here
  pub fn output(&self) -> StageResult<Output> {
    debug!(command = %self.display(), "running");

    let mut cmd = self.build();
    let Some(ref input) = self.stdin else {
      return cmd.output().map_err(|e| self.launch_failed(e));
    };

    let mut child = cmd
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(|e| self.launch_failed(e))?;

    if let Some(mut stdin) = child.stdin.take() {
      // A child that exits without reading stdin is judged by its exit status
      match stdin.write_all(input.as_bytes()) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::BrokenPipe => {}
        Err(e) => return Err(e.into()),
      }
    }

    child.wait_with_output().map_err(StageError::from)
  }

  /// Run with captured output, failing on non-zero exit
  pub fn run(&self) -> StageResult<Output> {
    let output = self.output()?;
    if !output.status.success() {
      return Err(StageError::Tool(ToolError::CommandFailed {
        command: self.display(),
        status: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }
    Ok(output)
  }

  /// Run attached to the operator's terminal (inherited stdio)
  ///
  /// Returns the exit status; only launching failures are errors.
  pub fn run_interactive(&self) -> StageResult<ExitStatus> {
    debug!(command = %self.display(), "running (interactive)");

    self
      .build()
      .stdin(Stdio::inherit())
      .stdout(Stdio::inherit())
      .stderr(Stdio::inherit())
      .status()
      .map_err(|e| self.launch_failed(e))
  }

  /// Check whether the command can be invoked and exits successfully
  pub fn probe(&self) -> bool {
    match self.output() {
      Ok(output) => output.status.success(),
      Err(_) => false,
    }
  }
}
