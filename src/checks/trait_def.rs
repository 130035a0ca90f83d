//! Check trait abstraction for staging preconditions
//!
//! Every gate `prepare` runs implements [`Check`]. The same checks back two
//! entry points: the fail-fast validation inside the pipeline and the
//! report-everything `stagehand check` command.

use crate::core::context::StageContext;
use crate::core::error::{StageError, StageResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity level for check results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
  /// Informational message (not an issue)
  Info,
  /// Error (blocking, must be fixed)
  Error,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Info => write!(f, "INFO"),
      Severity::Error => write!(f, "ERROR"),
    }
  }
}

/// Result of running a check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
  /// Name of the check that ran
  pub check_name: String,
  /// Whether the check passed
  pub passed: bool,
  /// Severity level (if failed)
  pub severity: Severity,
  /// Human-readable message
  pub message: String,
  /// Optional suggested fix
  pub suggestion: Option<String>,
  /// Additional metadata (for JSON output)
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<serde_json::Value>,
}

impl CheckResult {
  /// Create a passing check result
  pub fn pass(check_name: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      check_name: check_name.into(),
      passed: true,
      severity: Severity::Info,
      message: message.into(),
      suggestion: None,
      details: None,
    }
  }

  /// Create a failing check result from the error the check produced
  pub fn from_error(check_name: impl Into<String>, err: &StageError) -> Self {
    Self {
      check_name: check_name.into(),
      passed: false,
      severity: Severity::Error,
      message: err.to_string(),
      suggestion: err.help_message(),
      details: Some(serde_json::json!({ "kind": err.kind() })),
    }
  }
}

/// Precondition check trait
///
/// `run` returns a short summary on success and the precondition error on
/// failure. Checks have no side effects beyond invoking detection commands.
///
/// # Example
///
/// ```rust,ignore
/// struct LicenseHeaders;
///
/// impl Check for LicenseHeaders {
///   fn name(&self) -> &str {
///     "license-headers"
///   }
///
///   fn description(&self) -> &str {
///     "Every source file carries the license header"
///   }
///
///   fn run(&self, ctx: &StageContext) -> StageResult<String> {
///     if headers_ok(&ctx.root) {
///       Ok("all files carry the header".to_string())
///     } else {
///       Err(PreconditionError::ExternalCheckFailed { name: self.name().to_string() }.into())
///     }
///   }
/// }
/// ```
pub trait Check: Send + Sync {
  /// Unique name for this check (kebab-case)
  fn name(&self) -> &str;

  /// Human-readable description of what this check validates
  fn description(&self) -> &str;

  /// Run the check
  fn run(&self, ctx: &StageContext) -> StageResult<String>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::error::PreconditionError;

  #[test]
  fn test_result_from_error_carries_kind_and_help() {
    let err = StageError::from(PreconditionError::MissingTool {
      name: "prince".to_string(),
    });
    let result = CheckResult::from_error("tooling", &err);

    assert!(!result.passed);
    assert_eq!(result.severity, Severity::Error);
    assert!(result.message.contains("prince"));
    assert!(result.suggestion.unwrap().contains("PATH"));
    assert_eq!(result.details.unwrap()["kind"], "MissingTool");
  }
}
