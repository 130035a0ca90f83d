//! Required tools must be invocable as `<tool> --version`

use super::trait_def::Check;
use crate::core::context::StageContext;
use crate::core::error::{PreconditionError, StageResult};
use crate::core::process::ToolCommand;

pub struct ToolingCheck {
  tools: Vec<String>,
}

impl ToolingCheck {
  pub fn new(tools: Vec<String>) -> Self {
    Self { tools }
  }
}

impl Check for ToolingCheck {
  fn name(&self) -> &str {
    "tooling"
  }

  fn description(&self) -> &str {
    "required tools answer --version"
  }

  fn run(&self, _ctx: &StageContext) -> StageResult<String> {
    for tool in &self.tools {
      if !ToolCommand::new(tool).arg("--version").probe() {
        return Err(PreconditionError::MissingTool { name: tool.clone() }.into());
      }
    }

    if self.tools.is_empty() {
      Ok("no tools required".to_string())
    } else {
      Ok(format!("found {}", self.tools.join(", ")))
    }
  }
}

#[cfg(all(test, unix))]
mod tests {
  use super::*;
  use std::path::Path;

  #[test]
  fn test_missing_tool_named() {
    let ctx = crate::core::context::test_support::context(Path::new("/"));
    let check = ToolingCheck::new(vec!["true".to_string(), "stagehand-no-such-renderer".to_string()]);
    let err = check.run(&ctx).unwrap_err();
    assert_eq!(err.kind(), "MissingTool");
    assert!(err.to_string().contains("stagehand-no-such-renderer"));
  }

  #[test]
  fn test_no_tools_passes() {
    let ctx = crate::core::context::test_support::context(Path::new("/"));
    assert!(ToolingCheck::new(Vec::new()).run(&ctx).is_ok());
  }
}
