use crate::core::context::StageContext;
use crate::core::error::StageResult;
use crate::release::changelog;
use crate::utils;

/// Print the changelog entry for a version as it would be staged
pub fn run_changes(ctx: &StageContext, version: Option<String>) -> StageResult<()> {
  let version = version.unwrap_or_else(|| ctx.release_version());
  let document = utils::read_to_string(&ctx.changelog_path())?;
  let entries = changelog::extract_entries(&document);
  let entry = changelog::require_entry(&entries, &version)?;

  print!("{}", entry.render());
  Ok(())
}
