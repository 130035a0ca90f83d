//! `stagehand init` scaffolding

use crate::helpers::*;
use anyhow::Result;
use tempfile::TempDir;

#[test]
fn test_init_creates_config() -> Result<()> {
  let temp = TempDir::new()?;
  std::fs::write(temp.path().join("CHANGELOG"), CHANGELOG)?;

  let output = run_stagehand(temp.path(), &["init", "--project", "buildr"])?;
  assert!(stdout(&output).contains("Successfully initialized"));

  let config = std::fs::read_to_string(temp.path().join("stage.toml"))?;
  assert!(config.contains("name = \"buildr\""), "config: {}", config);
  assert!(config.contains("version = \"1.2.3\""));

  Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> Result<()> {
  let temp = TempDir::new()?;
  run_stagehand(temp.path(), &["init", "--project", "buildr", "--release", "2.0.0"])?;

  let output = run_stagehand_unchecked(temp.path(), &["init", "--project", "buildr"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Configuration already exists"));

  run_stagehand(temp.path(), &["init", "--project", "buildr", "--release", "2.1.0", "--force"])?;
  let config = std::fs::read_to_string(temp.path().join("stage.toml"))?;
  assert!(config.contains("version = \"2.1.0\""));

  Ok(())
}
