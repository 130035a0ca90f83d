//! Check runner for executing preconditions

use super::trait_def::{Check, CheckResult};
use crate::core::config::StageConfig;
use crate::core::context::StageContext;
use crate::core::error::StageResult;
use std::sync::Arc;
use tracing::{debug, info};

/// Check runner that executes multiple checks in registration order
pub struct CheckRunner {
  checks: Vec<Arc<dyn Check>>,
}

impl CheckRunner {
  /// Create a new check runner
  pub fn new() -> Self {
    Self { checks: Vec::new() }
  }

  /// Add a check to the runner
  pub fn add_check(&mut self, check: Arc<dyn Check>) {
    self.checks.push(check);
  }

  /// Run checks in order, stopping at the first failure
  ///
  /// The failing error is tagged `prepare/<check-name>`. With `quiet`,
  /// passing checks are only logged, never printed.
  pub fn validate(&self, ctx: &StageContext, quiet: bool) -> StageResult<()> {
    for check in &self.checks {
      debug!(check = check.name(), "running precondition");
      match check.run(ctx) {
        Ok(summary) => {
          info!(check = check.name(), "{}", summary);
          if !quiet {
            println!("   ✅ {}: {}", check.name(), summary);
          }
        }
        Err(err) => return Err(err.in_step(format!("prepare/{}", check.name()))),
      }
    }
    Ok(())
  }

  /// Run every check and collect results (not fail-fast)
  pub fn run_all(&self, ctx: &StageContext) -> Vec<CheckResult> {
    self
      .checks
      .iter()
      .map(|check| match check.run(ctx) {
        Ok(summary) => CheckResult::pass(check.name(), summary),
        Err(err) => CheckResult::from_error(check.name(), &err),
      })
      .collect()
  }

  /// Get all registered checks
  pub fn checks(&self) -> &[Arc<dyn Check>] {
    &self.checks
  }
}

impl Default for CheckRunner {
  fn default() -> Self {
    Self::new()
  }
}

/// Create a runner with the preconditions configured for this project
///
/// Order: working tree, changelog header, external checks (declaration
/// order), tool availability, platform gate.
pub fn create_precondition_runner(config: &StageConfig) -> CheckRunner {
  let mut runner = CheckRunner::new();

  runner.add_check(Arc::new(super::working_tree::WorkingTreeCheck));
  runner.add_check(Arc::new(super::changelog_header::ChangelogHeaderCheck));
  for external in &config.prepare.checks {
    runner.add_check(Arc::new(super::external::ExternalCheck::new(
      &external.name,
      external.command.clone(),
    )));
  }
  runner.add_check(Arc::new(super::tooling::ToolingCheck::new(
    config.prepare.required_tools.clone(),
  )));
  runner.add_check(Arc::new(super::platform::PlatformCheck::new(
    config.prepare.platform.clone(),
  )));

  runner
}
