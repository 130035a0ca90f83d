//! Host runtime gate: forbidden variants and minimum version

use super::trait_def::Check;
use crate::core::config::PlatformConfig;
use crate::core::context::StageContext;
use crate::core::error::{PreconditionError, StageResult};
use crate::core::process::ToolCommand;
use regex::Regex;
use semver::Version;
use std::sync::LazyLock;

static VERSION_TOKEN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"([0-9]+)\.([0-9]+)(?:\.([0-9]+))?").expect("version pattern is valid"));

pub struct PlatformCheck {
  platform: PlatformConfig,
}

impl PlatformCheck {
  pub fn new(platform: PlatformConfig) -> Self {
    Self { platform }
  }
}

/// First dotted version in `--version` output (`ruby 3.2.2p53 ...` → 3.2.2)
fn detect_version(output: &str) -> Option<Version> {
  let caps = VERSION_TOKEN.captures(output)?;
  let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
  Some(Version::new(part(1)?, part(2)?, part(3).unwrap_or(0)))
}

/// Judge a runtime's `--version` output against the gate
pub fn evaluate(
  runtime: &str,
  version_output: &str,
  forbidden_variants: &[String],
  min_version: Option<&Version>,
) -> Result<String, PreconditionError> {
  let lowered = version_output.to_lowercase();
  if let Some(variant) = forbidden_variants
    .iter()
    .find(|v| !v.is_empty() && lowered.contains(&v.to_lowercase()))
  {
    return Err(PreconditionError::UnsupportedPlatform {
      reason: format!("{} reports forbidden variant '{}'", runtime, variant),
    });
  }

  let Some(min) = min_version else {
    return Ok(format!("{} accepted", runtime));
  };

  let detected = detect_version(version_output).ok_or_else(|| PreconditionError::UnsupportedPlatform {
    reason: format!("could not determine {} version from '{}'", runtime, version_output.trim()),
  })?;

  if detected < *min {
    return Err(PreconditionError::UnsupportedPlatform {
      reason: format!("{} {} is older than the required {}", runtime, detected, min),
    });
  }

  Ok(format!("{} {} (>= {})", runtime, detected, min))
}

impl Check for PlatformCheck {
  fn name(&self) -> &str {
    "platform"
  }

  fn description(&self) -> &str {
    "host runtime is a supported variant and version"
  }

  fn run(&self, _ctx: &StageContext) -> StageResult<String> {
    let Some(ref runtime) = self.platform.runtime else {
      return Ok("no runtime gate configured".to_string());
    };

    let output = ToolCommand::new(runtime).arg("--version").run().map_err(|e| {
      PreconditionError::UnsupportedPlatform {
        reason: format!("could not query {}: {}", runtime, e),
      }
    })?;

    let min_version = match self.platform.min_version.as_deref() {
      Some(text) => Some(Version::parse(text).map_err(|e| PreconditionError::UnsupportedPlatform {
        reason: format!("minimum version '{}' is invalid: {}", text, e),
      })?),
      None => None,
    };

    let text = format!(
      "{}{}",
      String::from_utf8_lossy(&output.stdout),
      String::from_utf8_lossy(&output.stderr)
    );
    Ok(evaluate(runtime, &text, &self.platform.forbidden_variants, min_version.as_ref())?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn forbidden() -> Vec<String> {
    vec!["jruby".to_string()]
  }

  #[test]
  fn test_detect_version() {
    assert_eq!(
      detect_version("ruby 3.2.2 (2023-03-30 revision e51014f9c0) [x86_64-linux]"),
      Some(Version::new(3, 2, 2))
    );
    assert_eq!(detect_version("node v20.1"), Some(Version::new(20, 1, 0)));
    assert_eq!(detect_version("no digits here"), None);
  }

  #[test]
  fn test_forbidden_variant_rejected() {
    let err = evaluate("ruby", "jruby 9.4.2.0 (3.1.0) 2023-03-08", &forbidden(), None).unwrap_err();
    assert!(matches!(err, PreconditionError::UnsupportedPlatform { ref reason } if reason.contains("jruby")));

    let err = evaluate("ruby", "JRuby 9.4.2.0", &forbidden(), None).unwrap_err();
    assert!(matches!(err, PreconditionError::UnsupportedPlatform { .. }));
  }

  #[test]
  fn test_min_version_enforced() {
    let min = Version::new(1, 9, 0);

    assert!(evaluate("ruby", "ruby 1.9.3p551", &forbidden(), Some(&min)).is_ok());
    assert!(evaluate("ruby", "ruby 3.2.2", &forbidden(), Some(&min)).is_ok());

    let err = evaluate("ruby", "ruby 1.8.7 (2013-06-27)", &forbidden(), Some(&min)).unwrap_err();
    assert!(matches!(err, PreconditionError::UnsupportedPlatform { ref reason } if reason.contains("1.8.7")));

    assert!(evaluate("ruby", "ruby (unknown)", &forbidden(), Some(&min)).is_err());
  }

  #[test]
  fn test_no_runtime_configured_passes() {
    let ctx = crate::core::context::test_support::context(std::path::Path::new("/"));
    let check = PlatformCheck::new(PlatformConfig::default());
    assert_eq!(check.run(&ctx).unwrap(), "no runtime gate configured");
  }
}
