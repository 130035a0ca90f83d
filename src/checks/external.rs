//! Project-defined checks delegated to external commands (license audit, addons)

use super::trait_def::Check;
use crate::core::context::StageContext;
use crate::core::error::{PreconditionError, StageResult};
use crate::core::process::ToolCommand;
use tracing::warn;

pub struct ExternalCheck {
  name: String,
  description: String,
  command: Vec<String>,
}

impl ExternalCheck {
  pub fn new(name: &str, command: Vec<String>) -> Self {
    Self {
      name: name.to_string(),
      description: format!("`{}` exits successfully", command.join(" ")),
      command,
    }
  }

  fn failed(&self) -> PreconditionError {
    PreconditionError::ExternalCheckFailed { name: self.name.clone() }
  }
}

impl Check for ExternalCheck {
  fn name(&self) -> &str {
    &self.name
  }

  fn description(&self) -> &str {
    &self.description
  }

  fn run(&self, ctx: &StageContext) -> StageResult<String> {
    let command = ToolCommand::from_argv(&self.command)?.current_dir(&ctx.root);

    let output = match command.output() {
      Ok(output) => output,
      Err(err) => {
        warn!(check = %self.name, error = %err, "check could not be launched");
        return Err(self.failed().into());
      }
    };

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      let stdout = String::from_utf8_lossy(&output.stdout);
      warn!(check = %self.name, status = ?output.status.code(), "{}{}", stdout.trim_end(), stderr.trim_end());
      return Err(self.failed().into());
    }

    Ok(format!("`{}` passed", command.display()))
  }
}
