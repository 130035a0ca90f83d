//! Stage command: prepare, then every staging step

use crate::core::context::StageContext;
use crate::core::error::{StageError, StageResult};
use crate::stage::{StageReport, StagingPipeline};
use crate::utils;
use tracing::debug;

/// Run prepare and stage; with `dry_run`, print the staging plan instead
pub fn run_stage(ctx: &StageContext, dry_run: bool, json: bool) -> StageResult<()> {
  // stdout carries only the plan in JSON mode
  let mut pipeline = StagingPipeline::new(ctx).quiet(dry_run && json);
  pipeline.prepare()?;

  if dry_run {
    let plan = pipeline.plan();
    if json {
      let json_output = serde_json::to_string_pretty(&plan)
        .map_err(|e| StageError::message(format!("Failed to serialize JSON: {}", e)))?;
      println!("{}", json_output);
      return Ok(());
    }

    println!("\n📋 Staging plan for {} (dry run):", ctx.candidate_name());
    for (index, step) in plan.iter().enumerate() {
      let marker = if step.skipped { "⏭️ " } else { "  " };
      println!("  {}. {} {}: {}", index + 1, marker, step.step, step.detail);
    }
    println!("\n💡 Run without --dry-run to stage.");
    return Ok(());
  }

  let report = pipeline.stage()?;
  debug!(state = ?pipeline.state(), "pipeline finished");
  print_report(ctx, &report);
  Ok(())
}

fn print_report(ctx: &StageContext, report: &StageReport) {
  let rel = |p: &std::path::Path| utils::display_relative(&ctx.root, p);

  println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
  println!("✅ Staged {} at {}", ctx.candidate_name(), ctx.candidate_url());
  println!("   Changes:   {}", rel(&report.changes_file));
  println!("   Artifacts: {} signed", report.artifacts.len());
  for artifact in &report.artifacts {
    println!("     • {} (md5 {})", artifact.name(), artifact.md5());
  }
  match report.download_page_updated {
    Some(true) => println!("   Download page updated; review and commit it"),
    Some(false) => println!("   Download page unchanged"),
    None => println!("   Download page skipped"),
  }
  match report.site_files {
    Some(count) => println!("   Site:      {} files", count),
    None => println!("   Site:      skipped"),
  }
  println!("   Vote email: {}", rel(&report.vote_email_path));

  println!("\n{}", report.vote_email.render());
}
