//! External build tasks (packaging, site generation)

use crate::core::error::{StageResult, ToolError};
use crate::core::process::ToolCommand;
use std::path::Path;

/// Run a configured task attached to the terminal
///
/// A non-zero exit becomes `ExternalBuildFailed` naming the task.
pub fn run_task(task: &str, argv: &[String], root: &Path) -> StageResult<()> {
  let command = ToolCommand::from_argv(argv)?.current_dir(root);
  let status = command.run_interactive()?;

  if !status.success() {
    return Err(
      ToolError::ExternalBuildFailed {
        task: task.to_string(),
        command: command.display(),
        status: status.code(),
      }
      .into(),
    );
  }
  Ok(())
}
