//! Report every precondition without stopping at the first failure

use crate::checks::{Severity, create_precondition_runner};
use crate::core::context::StageContext;
use crate::core::error::{ExitCode, StageError, StageResult};

/// Run the check command
///
/// Exits with the validation code when any check fails.
pub fn run_check(ctx: &StageContext, json: bool) -> StageResult<()> {
  let runner = create_precondition_runner(&ctx.config);
  let results = runner.run_all(ctx);
  let failed = results.iter().any(|r| r.severity == Severity::Error);

  if json {
    let json_output = serde_json::to_string_pretty(&results)
      .map_err(|e| StageError::message(format!("Failed to serialize JSON: {}", e)))?;
    println!("{}", json_output);
  } else {
    println!(
      "🏥 Checking {} {} for staging...\n",
      ctx.config.project.display_name(),
      ctx.release_version()
    );

    println!("📋 Preconditions:");
    for check in runner.checks() {
      println!("   • {}: {}", check.name(), check.description());
    }
    println!();

    for result in &results {
      let icon = if result.passed { "✅" } else { "❌" };
      println!("{} {}: {}", icon, result.check_name, result.message);
      if let Some(ref suggestion) = result.suggestion {
        println!("   💡 Fix: {}", suggestion);
      }
    }

    let passed_count = results.iter().filter(|r| r.passed).count();
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Summary: {}/{} checks passed", passed_count, results.len());

    if failed {
      println!("\n⚠️  Fix the failures above before staging.");
    } else {
      println!("\n✨ Ready to stage.");
    }
  }

  if failed {
    std::process::exit(ExitCode::Validation.as_i32());
  }
  Ok(())
}
