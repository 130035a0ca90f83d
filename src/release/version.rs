//! Release version parsing and version-file synchronization

use crate::core::error::{DataError, StageResult};
use crate::utils;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

/// First `VERSION = '...'` or `VERSION = "..."` assignment
static VERSION_ASSIGNMENT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"\bVERSION\s*=\s*(?:'([^']*)'|"([^"]*)")"#).expect("VERSION pattern is valid"));

/// The version being released, as declared in `stage.toml`
///
/// Keeps the declared text for display and the leading numeric components
/// for deriving the base version. `"1.2.3.dev"` has components `[1, 2, 3]`
/// and suffix `"dev"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
  raw: String,
  components: Vec<u64>,
  suffix: Option<String>,
}

impl ReleaseVersion {
  pub fn parse(value: &str) -> StageResult<Self> {
    let raw = value.trim().to_string();
    let mut components = Vec::new();
    let mut suffix_parts: Vec<&str> = Vec::new();

    for part in raw.split('.') {
      if !suffix_parts.is_empty() {
        suffix_parts.push(part);
        continue;
      }

      let digits_end = part.find(|c: char| !c.is_ascii_digit()).unwrap_or(part.len());
      if digits_end > 0 {
        let number = part[..digits_end].parse::<u64>().map_err(|e| DataError::InvalidVersion {
          value: raw.clone(),
          reason: e.to_string(),
        })?;
        components.push(number);
      }
      if digits_end < part.len() {
        // "3-rc1" contributes 3 and starts the suffix at "-rc1"
        suffix_parts.push(&part[digits_end..]);
      }
    }

    if components.is_empty() {
      return Err(
        DataError::InvalidVersion {
          value: raw,
          reason: "no leading numeric component".to_string(),
        }
        .into(),
      );
    }

    let suffix = if suffix_parts.is_empty() {
      None
    } else {
      Some(suffix_parts.join(".").trim_start_matches(['-', '.']).to_string())
    };

    Ok(Self {
      raw,
      components,
      suffix,
    })
  }

  /// Pre-release suffix, if any (`"dev"` for `"1.2.3.dev"`)
  pub fn suffix(&self) -> Option<&str> {
    self.suffix.as_deref()
  }

  /// Leading numeric components truncated or zero-padded to `precision`
  ///
  /// `"1.2.3.dev"` → `"1.2.3"`, `"2.0"` → `"2.0.0"` (precision 3).
  pub fn base_version(&self, precision: usize) -> String {
    (0..precision.max(1))
      .map(|i| self.components.get(i).copied().unwrap_or(0).to_string())
      .collect::<Vec<_>>()
      .join(".")
  }
}

impl fmt::Display for ReleaseVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.raw)
  }
}

/// Rewrite the first `VERSION = ...` assignment to `version`
///
/// Returns `None` when the text has no assignment. Quote style and every
/// other byte are preserved.
pub fn rewrite_version_assignment(content: &str, version: &str) -> Option<String> {
  let caps = VERSION_ASSIGNMENT.captures(content)?;
  let value = caps.get(1).or_else(|| caps.get(2))?;

  let mut updated = String::with_capacity(content.len() + version.len());
  updated.push_str(&content[..value.start()]);
  updated.push_str(version);
  updated.push_str(&content[value.end()..]);
  Some(updated)
}

/// Synchronize the version file with the base version
///
/// A missing file is a no-op. The file is written only when its content
/// changes; returns whether it was.
pub fn sync_version(base_version: &str, version_file: &Path) -> StageResult<bool> {
  if !version_file.exists() {
    debug!(path = %version_file.display(), "version file absent, nothing to sync");
    return Ok(false);
  }

  let content = utils::read_to_string(version_file)?;
  let Some(updated) = rewrite_version_assignment(&content, base_version) else {
    debug!(path = %version_file.display(), "no VERSION assignment found");
    return Ok(false);
  };

  if updated == content {
    return Ok(false);
  }

  utils::write(version_file, updated)?;
  Ok(true)
}
