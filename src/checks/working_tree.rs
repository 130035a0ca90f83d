//! Working tree must have no pending local modifications

use super::trait_def::Check;
use crate::core::context::StageContext;
use crate::core::error::{PreconditionError, StageResult};
use crate::core::vcs::SystemGit;

pub struct WorkingTreeCheck;

impl Check for WorkingTreeCheck {
  fn name(&self) -> &str {
    "working-tree"
  }

  fn description(&self) -> &str {
    "git status reports no local modifications"
  }

  fn run(&self, ctx: &StageContext) -> StageResult<String> {
    let git = SystemGit::open(&ctx.root)?;
    let entries = git.status_porcelain()?;

    if entries.is_empty() {
      return Ok("working tree is clean".to_string());
    }

    let details = entries
      .iter()
      .map(|e| format!("  {}", e))
      .collect::<Vec<_>>()
      .join("\n");
    Err(PreconditionError::DirtyWorkingTree { details }.into())
  }
}
