//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const CHANGELOG: &str = "\
1.2.3 (2024-05-01)
* Added: release candidate staging
* Fixed: version file sync

1.2.2 (2024-01-10)
* Fixed: an older bug
";

pub const DOWNLOAD_PAGE: &str = "\
h1. Download

h2(#dist). Binaries and Source Code

h3. buildr 1.2.2 (2024-01-10)

|_. Package |_. MD5 Checksum |_. PGP |
| \"buildr-1.2.2.tgz\":https://www.apache.org/dyn/closer.cgi/buildr/1.2.2/buildr-1.2.2.tgz | \"5e8a\":https://www.apache.org/dist/buildr/1.2.2/buildr-1.2.2.tgz.md5 | \"Sig\":https://www.apache.org/dist/buildr/1.2.2/buildr-1.2.2.tgz.asc |
";

/// Stub external tools installed outside the workspace
pub struct StubTools {
  _root: TempDir,
  pub path: PathBuf,
}

impl StubTools {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    let svn_log = path.join("svn.log");

    // gpg: write something to the --output file
    write_script(
      &path.join("gpg"),
      "while [ $# -gt 0 ]; do\n  if [ \"$1\" = \"--output\" ]; then echo '-----BEGIN PGP SIGNATURE-----' > \"$2\"; fi\n  shift\ndone\n",
    )?;

    // svn: record every invocation
    write_script(&path.join("svn"), &format!("echo \"$*\" >> '{}'\n", svn_log.display()))?;

    // svn where the candidate directory already exists
    write_script(
      &path.join("svn-exists"),
      &format!(
        "echo \"$*\" >> '{}'\nif [ \"$1\" = \"mkdir\" ]; then\n  echo \"svn: E160020: Path 'buildr/1.2.3' already exists\" >&2\n  exit 1\nfi\n",
        svn_log.display()
      ),
    )?;

    write_script(
      &path.join("build"),
      "mkdir -p pkg\nprintf 'tgz bytes' > pkg/buildr-1.2.3.tgz\nprintf 'zip bytes' > pkg/buildr-1.2.3.zip\n",
    )?;

    write_script(
      &path.join("site"),
      "mkdir -p _site/css\necho '<html/>' > _site/index.html\necho 'body {}' > _site/css/site.css\n",
    )?;

    write_script(&path.join("prince"), "exit 0\n")?;

    Ok(Self { _root: root, path })
  }

  pub fn tool(&self, name: &str) -> String {
    self.path.join(name).display().to_string()
  }

  /// Invocations recorded by the svn stubs
  pub fn svn_log(&self) -> Vec<String> {
    fs::read_to_string(self.path.join("svn.log"))
      .unwrap_or_default()
      .lines()
      .map(String::from)
      .collect()
  }
}

fn write_script(path: &Path, body: &str) -> Result<()> {
  fs::write(path, format!("#!/bin/sh\n{}", body))?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
  }

  Ok(())
}

/// A committed release workspace for buildr 1.2.3
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
  pub tools: StubTools,
}

impl TestWorkspace {
  /// Create a clean workspace ready to stage on 2024-05-01
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    let tools = StubTools::new()?;

    // Initialize git repo with main as default branch
    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    let workspace = Self {
      _root: root,
      path,
      tools,
    };

    workspace.write_file("CHANGELOG", CHANGELOG)?;
    workspace.write_file("lib/buildr/version.rb", "module Buildr\n  VERSION = '1.2.3'.freeze\nend\n")?;
    workspace.write_file("doc/download.textile", DOWNLOAD_PAGE)?;
    workspace.write_file(".gitignore", "_staged/\n_vote-email\npkg/\n_site/\n")?;
    workspace.write_config(&workspace.default_config())?;
    workspace.commit("Initial release workspace")?;

    Ok(workspace)
  }

  /// stage.toml wired to the stub tools
  pub fn default_config(&self) -> String {
    format!(
      r#"[project]
name = "buildr"

[release]
version = "1.2.3"
version_file = "lib/buildr/version.rb"

[prepare]
required_tools = ["{prince}"]

[build]
command = ["{build}"]

[sign]
program = "{gpg}"
user = "release@example.org"

[site]
command = ["{site}"]

[upload]
program = "{svn}"
dist_root = "https://dist.example.org/repos/dist/dev/buildr"
"#,
      prince = self.tools.tool("prince"),
      build = self.tools.tool("build"),
      gpg = self.tools.tool("gpg"),
      site = self.tools.tool("site"),
      svn = self.tools.tool("svn"),
    )
  }

  pub fn write_config(&self, content: &str) -> Result<()> {
    self.write_file("stage.toml", content)
  }

  /// Write a file, creating parent directories
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(full, content)?;
    Ok(())
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<()> {
    git(&self.path, &["add", "-A"])?;
    git(&self.path, &["commit", "-m", message])?;
    Ok(())
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    fs::read_to_string(self.path.join(path)).with_context(|| format!("Failed to read {}", path))
  }

  /// Sorted file names in a workspace directory
  pub fn list_dir(&self, path: &str) -> Result<Vec<String>> {
    let mut names = fs::read_dir(self.path.join(path))?
      .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
      .collect::<std::io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run stagehand with a clean run-settings environment, whatever its exit status
pub fn run_stagehand_unchecked(cwd: &Path, args: &[&str]) -> Result<Output> {
  let stagehand_bin = env!("CARGO_BIN_EXE_stagehand");

  Command::new(stagehand_bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("STAGE_DATE")
    .env_remove("RC")
    .env_remove("GPG_USER")
    .env("GPG_PASS", "test-passphrase")
    .output()
    .context("Failed to run stagehand")
}

/// Run stagehand and fail unless it exits successfully
pub fn run_stagehand(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_stagehand_unchecked(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "stagehand command failed: stagehand {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
