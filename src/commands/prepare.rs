use crate::core::context::StageContext;
use crate::core::error::StageResult;
use crate::stage::StagingPipeline;

/// Run the prepare phase on its own
pub fn run_prepare(ctx: &StageContext) -> StageResult<()> {
  let mut pipeline = StagingPipeline::new(ctx);
  pipeline.prepare()?;

  println!(
    "\n✅ {} {} is ready to stage (stage date {})",
    ctx.config.project.display_name(),
    ctx.release_version(),
    ctx.settings.stage_date_iso()
  );
  Ok(())
}
