//! Full staging runs against stub gpg/svn/build/site tools

use crate::helpers::*;
use anyhow::Result;

const STAGE: &[&str] = &["stage", "--stage-date", "2024-05-01"];

#[test]
fn test_stage_happy_path() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_stagehand(&ws.path, STAGE)?;
  let out = stdout(&output);
  assert!(
    out.contains("Staged 1.2.3 at https://dist.example.org/repos/dist/dev/buildr/1.2.3"),
    "stdout: {}",
    out
  );

  // CHANGES holds exactly this release's entry
  assert_eq!(
    ws.read_file("_staged/CHANGES")?,
    "1.2.3 (2024-05-01)\n* Added: release candidate staging\n* Fixed: version file sync\n"
  );

  // Every artifact with md5, sha1, and a detached signature
  assert_eq!(
    ws.list_dir("_staged/dist")?,
    vec![
      "buildr-1.2.3.tgz",
      "buildr-1.2.3.tgz.asc",
      "buildr-1.2.3.tgz.md5",
      "buildr-1.2.3.tgz.sha1",
      "buildr-1.2.3.zip",
      "buildr-1.2.3.zip.asc",
      "buildr-1.2.3.zip.md5",
      "buildr-1.2.3.zip.sha1",
    ]
  );
  let md5 = ws.read_file("_staged/dist/buildr-1.2.3.tgz.md5")?;
  let (digest, name) = md5.trim_end().split_once(' ').unwrap_or_default();
  assert_eq!(digest.len(), 32);
  assert_eq!(name, "buildr-1.2.3.tgz");
  let sha1 = ws.read_file("_staged/dist/buildr-1.2.3.zip.sha1")?;
  assert_eq!(sha1.split_whitespace().next().map(str::len), Some(40));

  // Site bundle
  assert!(ws.file_exists("_staged/site/index.html"));
  assert!(ws.file_exists("_staged/site/css/site.css"));

  // svn: mkdir, checkout, add, commit in that order
  let svn = ws.tools.svn_log();
  assert_eq!(svn.len(), 4, "svn calls: {:?}", svn);
  assert!(svn[0].starts_with("mkdir -m Staging Buildr 1.2.3"));
  assert!(svn[0].ends_with("https://dist.example.org/repos/dist/dev/buildr/1.2.3"));
  assert!(svn[1].starts_with("checkout --force https://dist.example.org/repos/dist/dev/buildr/1.2.3 "));
  assert_eq!(svn[2], "add --force .");
  assert!(svn[3].starts_with("commit -m Staging Buildr 1.2.3"));

  // Download page: new table after the marker, old links archived
  let page = ws.read_file("doc/download.textile")?;
  let marker = page.find("h2(#dist)").unwrap_or(usize::MAX);
  let block = page.find("h3. buildr 1.2.3 (2024-05-01)").unwrap_or(0);
  assert!(marker < block, "page: {}", page);
  assert!(page.contains(
    "| \"buildr-1.2.3.tgz\":https://www.apache.org/dyn/closer.cgi/buildr/1.2.3/buildr-1.2.3.tgz |"
  ));
  assert!(page.contains("\"Sig\":https://www.apache.org/dist/buildr/1.2.3/buildr-1.2.3.zip.asc"));
  assert!(page.contains("https://archive.apache.org/dist/buildr/1.2.2/buildr-1.2.2.tgz.md5"));
  assert!(!page.contains("https://www.apache.org/dyn/closer.cgi/buildr/1.2.2/"));

  // Vote email draft
  let email = ws.read_file("_vote-email")?;
  assert!(email.starts_with("To: dev@buildr.apache.org\nSubject: [VOTE] Buildr 1.2.3 release\n"));
  assert!(email.contains("https://dist.example.org/repos/dist/dev/buildr/1.2.3/dist/buildr-1.2.3.tgz"));
  assert!(email.contains("https://dist.example.org/repos/dist/dev/buildr/1.2.3/dist/buildr-1.2.3.zip"));
  assert!(email.contains("https://dist.example.org/repos/dist/dev/buildr/1.2.3/site/"));
  assert!(email.contains("The following changes were made since 1.2.2:"));
  assert!(email.contains("  * Fixed: version file sync"));
  assert!(!email.contains("an older bug"));

  Ok(())
}

#[test]
fn test_stage_with_release_candidate_suffix() -> Result<()> {
  let ws = TestWorkspace::new()?;

  run_stagehand(&ws.path, &["stage", "--stage-date", "2024-05-01", "--rc=-rc2"])?;

  let svn = ws.tools.svn_log();
  assert!(svn[0].ends_with("https://dist.example.org/repos/dist/dev/buildr/1.2.3-rc2"));

  // Package names and the subject keep the plain version
  let email = ws.read_file("_vote-email")?;
  assert!(email.contains("Subject: [VOTE] Buildr 1.2.3 release"));
  assert!(email.contains("https://dist.example.org/repos/dist/dev/buildr/1.2.3-rc2/dist/buildr-1.2.3.tgz"));

  Ok(())
}

#[test]
fn test_stage_aborts_when_remote_directory_exists() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let config = ws
    .default_config()
    .replace(&ws.tools.tool("svn"), &ws.tools.tool("svn-exists"));
  ws.write_config(&config)?;
  ws.commit("Use svn that reports an existing directory")?;

  let output = run_stagehand_unchecked(&ws.path, STAGE)?;
  let err = stderr(&output);

  assert_eq!(output.status.code(), Some(2));
  assert!(err.contains("[stage/upload]"), "stderr: {}", err);
  assert!(err.contains("already exists"));

  // Only mkdir ran; completed local steps are left in place
  assert_eq!(ws.tools.svn_log().len(), 1);
  assert!(ws.file_exists("_staged/dist/buildr-1.2.3.tgz"));
  assert!(!ws.file_exists("_vote-email"));

  Ok(())
}

#[test]
fn test_stage_clobbers_previous_output() -> Result<()> {
  let ws = TestWorkspace::new()?;
  // Both paths are ignored, so the tree stays clean
  ws.write_file("_staged/dist/stale-0.9.tgz", "old")?;
  ws.write_file("_vote-email", "old draft")?;

  run_stagehand(&ws.path, STAGE)?;

  assert!(!ws.file_exists("_staged/dist/stale-0.9.tgz"));
  assert!(ws.read_file("_vote-email")?.starts_with("To: dev@buildr.apache.org"));

  Ok(())
}

#[test]
fn test_stage_requires_signer() -> Result<()> {
  let ws = TestWorkspace::new()?;
  let config = ws.default_config().replace("user = \"release@example.org\"\n", "");
  ws.write_config(&config)?;
  ws.commit("Drop signer")?;

  let output = run_stagehand_unchecked(&ws.path, STAGE)?;
  let err = stderr(&output);

  assert_eq!(output.status.code(), Some(1));
  assert!(err.contains("sign.user"), "stderr: {}", err);
  assert!(!ws.file_exists("_staged"));

  // A flag supplies it as well
  let output = run_stagehand(&ws.path, &["stage", "--stage-date", "2024-05-01", "--gpg-user", "rm@example.org"])?;
  assert!(output.status.success());

  Ok(())
}

#[test]
fn test_stage_dry_run_changes_nothing() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_stagehand(&ws.path, &["stage", "--stage-date", "2024-05-01", "--dry-run"])?;
  let out = stdout(&output);

  assert!(out.contains("Staging plan for 1.2.3"), "stdout: {}", out);
  assert!(out.contains("vote-email"));
  assert!(!ws.file_exists("_staged"));
  assert!(!ws.file_exists("_vote-email"));
  assert!(ws.tools.svn_log().is_empty());

  Ok(())
}

#[test]
fn test_stage_dry_run_json() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_stagehand(&ws.path, &["stage", "--stage-date", "2024-05-01", "--dry-run", "--json"])?;
  let out = stdout(&output);

  // Prepare still runs, but stdout holds nothing except the plan
  assert!(out.trim_start().starts_with('['), "stdout: {}", out);
  assert!(!out.contains("Preparing"));
  assert!(!out.contains("working-tree"));
  let plan: serde_json::Value = serde_json::from_str(&out)?;
  let steps: Vec<&str> = plan
    .as_array()
    .map(|steps| steps.iter().filter_map(|s| s["step"].as_str()).collect())
    .unwrap_or_default();

  assert_eq!(
    steps,
    vec![
      "clobber",
      "permissions",
      "changes",
      "build",
      "artifacts",
      "download-page",
      "site",
      "upload",
      "vote-email"
    ]
  );

  Ok(())
}

#[test]
fn test_clobber_command() -> Result<()> {
  let ws = TestWorkspace::new()?;
  run_stagehand(&ws.path, STAGE)?;

  let output = run_stagehand(&ws.path, &["clobber", "--stage-date", "2024-05-01"])?;
  assert!(stdout(&output).contains("Removed _staged"));
  assert!(!ws.file_exists("_staged"));
  assert!(!ws.file_exists("_vote-email"));

  let output = run_stagehand(&ws.path, &["clobber"])?;
  assert!(stdout(&output).contains("Nothing to clean."));

  Ok(())
}

#[test]
fn test_changes_command() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_stagehand(&ws.path, &["changes", "1.2.2"])?;
  assert_eq!(stdout(&output), "1.2.2 (2024-01-10)\n* Fixed: an older bug\n");

  let output = run_stagehand_unchecked(&ws.path, &["changes", "9.9.9"])?;
  assert_eq!(output.status.code(), Some(4));
  assert!(stderr(&output).contains("No changeset found for version 9.9.9"));

  Ok(())
}
