use anyhow::Context;
use std::path::Path;

use crate::core::config::StageConfig;
use crate::core::error::{StageError, StageResult};
use crate::release::changelog;
use crate::utils;

/// Run the init command to write a default stage.toml
pub fn run_init(workspace_root: &Path, project: Option<String>, version: Option<String>, force: bool) -> StageResult<()> {
  if let Some(existing) = StageConfig::find_config_path(workspace_root)
    && !force
  {
    return Err(StageError::with_help(
      format!("Configuration already exists: {}", existing.display()),
      "Pass --force to overwrite it.",
    ));
  }

  let project = match project {
    Some(name) => name,
    None => project_name_from_dir(workspace_root)?,
  };
  let version = match version {
    Some(v) => v,
    None => version_from_changelog(&workspace_root.join("CHANGELOG")).unwrap_or_else(|| "0.1.0".to_string()),
  };

  let config = StageConfig::new(&project, &version);
  config.validate()?;

  println!("🔧 Scaffolding configuration for {} {}", project, version);
  let path = config.save(workspace_root)?;

  println!("\n✅ Successfully initialized stagehand!");
  println!("   Configuration saved to: {}", path.display());
  println!("\n🚀 Next steps:");
  println!("   1. Set [release] version_file if the sources embed VERSION = \"...\"");
  println!("   2. Set [build] command and [site] command for your packaging tasks");
  println!("   3. Set [sign] user (or export GPG_USER)");
  println!("   4. Run: stagehand check");

  Ok(())
}

/// Lowercased name of the workspace directory
fn project_name_from_dir(workspace_root: &Path) -> anyhow::Result<String> {
  let canonical = workspace_root
    .canonicalize()
    .with_context(|| format!("Failed to resolve {}", workspace_root.display()))?;
  let name = utils::file_name(&canonical).map_err(|e| anyhow::anyhow!("{}", e))?;
  Ok(name.to_lowercase())
}

/// Version of the newest changelog entry, if there is a changelog
fn version_from_changelog(path: &Path) -> Option<String> {
  let document = std::fs::read_to_string(path).ok()?;
  changelog::extract_entries(&document)
    .into_iter()
    .next()
    .map(|entry| entry.version)
}
