//! `stagehand check` reports every precondition

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_check_json_all_pass() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_stagehand(&ws.path, &["check", "--json", "--stage-date", "2024-05-01"])?;
  let results: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout)?;

  let names: Vec<&str> = results.iter().filter_map(|r| r["check_name"].as_str()).collect();
  assert_eq!(names, vec!["working-tree", "changelog-header", "tooling", "platform"]);
  assert!(results.iter().all(|r| r["passed"] == true));

  Ok(())
}

#[test]
fn test_check_reports_every_failure() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("notes.txt", "scratch\n")?;

  let output = run_stagehand_unchecked(&ws.path, &["check", "--json", "--stage-date", "2024-05-02"])?;
  assert_eq!(output.status.code(), Some(3));

  let results: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout)?;
  let failed: Vec<&str> = results
    .iter()
    .filter(|r| r["passed"] == false)
    .filter_map(|r| r["check_name"].as_str())
    .collect();
  assert_eq!(failed, vec!["working-tree", "changelog-header"]);
  assert_eq!(results[0]["details"]["kind"], "DirtyWorkingTree");

  Ok(())
}

#[test]
fn test_check_human_output() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_stagehand(&ws.path, &["check", "--stage-date", "2024-05-01"])?;
  let out = stdout(&output);

  assert!(out.contains("Summary: 4/4 checks passed"), "stdout: {}", out);
  assert!(out.contains("Ready to stage."));

  Ok(())
}
