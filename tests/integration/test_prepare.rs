//! Prepare phase: version sync and fail-fast preconditions

use crate::helpers::*;
use anyhow::Result;

const DATE: &[&str] = &["--stage-date", "2024-05-01"];

fn prepare_args() -> Vec<&'static str> {
  let mut args = vec!["prepare"];
  args.extend_from_slice(DATE);
  args
}

#[test]
fn test_prepare_clean_workspace() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_stagehand(&ws.path, &prepare_args())?;
  let out = stdout(&output);

  assert!(out.contains("Buildr 1.2.3 is ready to stage"), "stdout: {}", out);
  assert!(out.contains("working-tree"));
  assert!(out.contains("changelog-header"));
  assert!(!ws.file_exists("_staged"), "prepare must not create staging output");

  Ok(())
}

#[test]
fn test_prepare_rejects_dirty_tree() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("notes.txt", "scratch\n")?;

  let output = run_stagehand_unchecked(&ws.path, &prepare_args())?;
  let err = stderr(&output);

  assert_eq!(output.status.code(), Some(3));
  assert!(err.contains("[prepare/working-tree]"), "stderr: {}", err);
  assert!(err.contains("notes.txt"));

  Ok(())
}

#[test]
fn test_stage_with_dirty_tree_leaves_no_output() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("CHANGELOG", &format!("{}* Uncommitted line\n", CHANGELOG))?;

  let output = run_stagehand_unchecked(&ws.path, &["stage", "--stage-date", "2024-05-01"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(!ws.file_exists("_staged"));
  assert!(!ws.file_exists("_vote-email"));
  assert!(ws.tools.svn_log().is_empty(), "nothing may be uploaded");

  Ok(())
}

#[test]
fn test_prepare_rejects_changelog_header_mismatch() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_stagehand_unchecked(&ws.path, &["prepare", "--stage-date", "2024-05-02"])?;
  let err = stderr(&output);

  assert_eq!(output.status.code(), Some(3));
  assert!(err.contains("[prepare/changelog-header]"), "stderr: {}", err);
  assert!(err.contains("1.2.3 (2024-05-02)"));
  assert!(err.contains("1.2.3 (2024-05-01)"));

  Ok(())
}

#[test]
fn test_stage_date_from_environment() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = std::process::Command::new(env!("CARGO_BIN_EXE_stagehand"))
    .current_dir(&ws.path)
    .arg("prepare")
    .env("STAGE_DATE", "2024-05-01")
    .env_remove("RC")
    .env_remove("GPG_USER")
    .output()?;

  assert!(output.status.success(), "stderr: {}", stderr(&output));
  Ok(())
}

#[test]
fn test_prepare_rejects_missing_tool() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let config = ws
    .default_config()
    .replace(&ws.tools.tool("prince"), "stagehand-missing-renderer");
  ws.write_config(&config)?;
  ws.commit("Require a missing tool")?;

  let output = run_stagehand_unchecked(&ws.path, &prepare_args())?;
  let err = stderr(&output);

  assert_eq!(output.status.code(), Some(3));
  assert!(err.contains("[prepare/tooling]"), "stderr: {}", err);
  assert!(err.contains("stagehand-missing-renderer"));

  Ok(())
}

#[test]
fn test_prepare_runs_configured_checks() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let config = format!(
    "{}\n[[prepare.checks]]\nname = \"license\"\ncommand = [\"false\"]\n",
    ws.default_config()
  );
  ws.write_config(&config)?;
  ws.commit("Add license check")?;

  let output = run_stagehand_unchecked(&ws.path, &prepare_args())?;
  let err = stderr(&output);

  assert_eq!(output.status.code(), Some(3));
  assert!(err.contains("External check 'license' failed"), "stderr: {}", err);

  Ok(())
}

#[test]
fn test_prepare_syncs_version_file() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let config = ws
    .default_config()
    .replace("version = \"1.2.3\"", "version = \"1.2.3.rc1\"");
  ws.write_config(&config)?;
  ws.write_file("lib/buildr/version.rb", "module Buildr\n  VERSION = '1.2.3.rc1'.freeze\nend\n")?;
  ws.commit("Pre-release version")?;

  // The rewrite itself dirties the tree, so the first prepare stops there
  let output = run_stagehand_unchecked(&ws.path, &prepare_args())?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stdout(&output).contains("Set VERSION to 1.2.3"));
  assert!(stderr(&output).contains("lib/buildr/version.rb"));
  assert_eq!(
    ws.read_file("lib/buildr/version.rb")?,
    "module Buildr\n  VERSION = '1.2.3'.freeze\nend\n"
  );

  ws.commit("Set release version")?;
  let output = run_stagehand(&ws.path, &prepare_args())?;
  assert!(!stdout(&output).contains("Set VERSION"), "an in-sync file is not rewritten");

  Ok(())
}

#[test]
fn test_missing_config_is_user_error() -> Result<()> {
  let temp = tempfile::TempDir::new()?;

  let output = run_stagehand_unchecked(temp.path(), &prepare_args())?;

  assert_eq!(output.status.code(), Some(1));
  Ok(())
}
