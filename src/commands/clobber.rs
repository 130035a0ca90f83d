use crate::core::context::StageContext;
use crate::core::error::StageResult;
use crate::stage;
use crate::utils;

/// Remove staging output from a previous run
pub fn run_clobber(ctx: &StageContext) -> StageResult<()> {
  let removed = stage::clobber(ctx)?;

  if removed.is_empty() {
    println!("Nothing to clean.");
  }
  for path in removed {
    println!("🗑️  Removed {}", utils::display_relative(&ctx.root, &path));
  }
  Ok(())
}
