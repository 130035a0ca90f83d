//! System git backend
//!
//! The pipeline only asks git one question (is the working tree clean?), so
//! this is a thin wrapper over the git binary with an isolated environment.

use crate::core::error::{StageError, StageResult, ToolError};
use crate::core::vcs::StatusEntry;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Git backend using system git
pub struct SystemGit {
  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open the git repository containing `path`
  pub fn open(path: &Path) -> StageResult<Self> {
    let output = Self::command_in(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .map_err(|e| {
        StageError::Tool(ToolError::LaunchFailed {
          command: "git rev-parse --show-toplevel".to_string(),
          reason: e.to_string(),
        })
      })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(StageError::with_help(
          format!("Not a git repository: {}", path.display()),
          "Staging must run from a git checkout of the project.",
        ));
      }
      return Err(StageError::Tool(ToolError::CommandFailed {
        command: "git rev-parse --show-toplevel".to_string(),
        status: output.status.code(),
        stderr: stderr.to_string(),
      }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(Self {
      work_tree: PathBuf::from(stdout.trim()),
    })
  }

  /// Pending local modifications (`git status --porcelain`)
  ///
  /// Untracked files count; ignored files do not.
  pub fn status_porcelain(&self) -> StageResult<Vec<StatusEntry>> {
    let output = self.git_cmd().args(["status", "--porcelain"]).output().map_err(|e| {
      StageError::Tool(ToolError::LaunchFailed {
        command: "git status --porcelain".to_string(),
        reason: e.to_string(),
      })
    })?;

    if !output.status.success() {
      return Err(StageError::Tool(ToolError::CommandFailed {
        command: "git status --porcelain".to_string(),
        status: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let entries: Vec<StatusEntry> = stdout.lines().filter_map(StatusEntry::parse).collect();
    debug!(entries = entries.len(), "git status");
    Ok(entries)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the work tree
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    Self::command_in(&self.work_tree)
  }

  fn command_in(dir: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(dir);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII
    cmd.arg("-c").arg("color.status=false");

    cmd
  }
}
