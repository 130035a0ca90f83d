//! The changelog must open with this release's header

use super::trait_def::Check;
use crate::core::context::StageContext;
use crate::core::error::{PreconditionError, StageResult};
use crate::release::changelog;
use crate::utils;

pub struct ChangelogHeaderCheck;

/// Compare the changelog's first line against the expected header
///
/// Only the line terminator is stripped; trailing whitespace is a mismatch.
pub fn evaluate(document: &str, expected: &str) -> Result<(), PreconditionError> {
  let actual = document.lines().next().unwrap_or("");
  if actual == expected {
    Ok(())
  } else {
    Err(PreconditionError::ChangelogHeaderMismatch {
      expected: expected.to_string(),
      actual: actual.to_string(),
    })
  }
}

impl Check for ChangelogHeaderCheck {
  fn name(&self) -> &str {
    "changelog-header"
  }

  fn description(&self) -> &str {
    "first changelog line is '<version> (<stage date>)'"
  }

  fn run(&self, ctx: &StageContext) -> StageResult<String> {
    let expected = changelog::header_line(&ctx.release_version(), ctx.settings.stage_date);
    let document = utils::read_to_string(&ctx.changelog_path())?;
    evaluate(&document, &expected)?;
    Ok(format!("changelog opens with '{}'", expected))
  }
}
