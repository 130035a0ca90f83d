//! Permission normalization before packaging
//!
//! Every file in the workspace gains group/other read and every directory
//! gains group/other read+execute, so archives built from the tree are
//! readable by everyone who unpacks them. `.git` and the staging directory
//! are left alone.

use crate::core::error::StageResult;
use std::path::Path;

/// Directory names never descended into
const SKIPPED: &[&str] = &[".git", crate::core::context::STAGING_DIR];

/// Normalize permissions under `root`; returns how many entries changed
#[cfg(unix)]
pub fn normalize(root: &Path) -> StageResult<usize> {
  use crate::utils::with_path;
  use std::fs;
  use std::os::unix::fs::PermissionsExt;

  let mut changed = 0;
  let mut pending = vec![root.to_path_buf()];

  while let Some(dir) = pending.pop() {
    for entry in fs::read_dir(&dir).map_err(|e| with_path(e, &dir))? {
      let entry = entry?;
      let path = entry.path();
      let file_type = entry.file_type()?;

      // Symlinks point at something we either visit anyway or don't own
      if file_type.is_symlink() {
        continue;
      }

      let wanted = if file_type.is_dir() {
        if SKIPPED.iter().any(|s| entry.file_name() == *s) {
          continue;
        }
        pending.push(path.clone());
        0o055
      } else {
        0o044
      };

      let mut perms = entry.metadata()?.permissions();
      let mode = perms.mode();
      if mode & wanted != wanted {
        perms.set_mode(mode | wanted);
        fs::set_permissions(&path, perms).map_err(|e| with_path(e, &path))?;
        changed += 1;
      }
    }
  }

  Ok(changed)
}

/// Permission bits are a Unix notion; nothing to do elsewhere
#[cfg(not(unix))]
pub fn normalize(_root: &Path) -> StageResult<usize> {
  Ok(0)
}
