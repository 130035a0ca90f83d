//! Upload of the staging directory to the distribution repository
//!
//! The sequence is mkdir, checkout over the staging directory, add, commit.
//! Each step must succeed before the next starts. A remote directory created
//! by `mkdir` is left in place when a later step fails.

use crate::core::error::{StageResult, ToolError};
use crate::core::process::ToolCommand;
use std::path::Path;
use tracing::info;

/// svn reports an existing path with this error code
const EXISTS_CODE: &str = "E160020";

pub struct DistributionUploader {
  program: String,
}

impl DistributionUploader {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
    }
  }

  fn command(&self) -> ToolCommand {
    ToolCommand::new(&self.program)
  }

  /// Create the remote directory; an existing one is `DirectoryExists`
  fn mkdir(&self, url: &str, message: &str) -> StageResult<()> {
    let command = self.command().args(["mkdir", "-m", message, url]);
    let output = command.output()?;

    if output.status.success() {
      return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    if stderr.contains(EXISTS_CODE) || stderr.contains("already exists") {
      return Err(ToolError::DirectoryExists { url: url.to_string() }.into());
    }

    Err(
      ToolError::CommandFailed {
        command: command.display(),
        status: output.status.code(),
        stderr,
      }
      .into(),
    )
  }

  /// Commit the contents of `staging_dir` to `<url>`
  pub fn upload(&self, staging_dir: &Path, url: &str, message: &str) -> StageResult<()> {
    info!(url, "creating remote directory");
    self.mkdir(url, message)?;

    info!(url, "checking out over staging directory");
    self
      .command()
      .args(["checkout", "--force", url])
      .arg(staging_dir.to_string_lossy())
      .run()?;

    self
      .command()
      .args(["add", "--force", "."])
      .current_dir(staging_dir)
      .run()?;

    info!(url, "committing");
    self
      .command()
      .args(["commit", "-m", message])
      .current_dir(staging_dir)
      .run()?;

    Ok(())
  }
}
