//! Utility functions for path handling and file I/O with path-aware errors

use crate::core::error::{StageError, StageResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Express `path` relative to `base` for operator-facing output
///
/// Falls back to the path unchanged when no relative form exists
/// (e.g. different drive prefixes on Windows).
pub fn relative_to(base: &Path, path: &Path) -> PathBuf {
  pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Display form of a path relative to the workspace root
pub fn display_relative(base: &Path, path: &Path) -> String {
  let rel = relative_to(base, path);
  if rel.as_os_str().is_empty() {
    ".".to_string()
  } else {
    rel.display().to_string()
  }
}

/// Base file name of a path as a UTF-8 string
pub fn file_name(path: &Path) -> StageResult<String> {
  path
    .file_name()
    .and_then(|n| n.to_str())
    .map(str::to_string)
    .ok_or_else(|| StageError::message(format!("Path has no usable file name: {}", path.display())))
}

/// Read a UTF-8 file, keeping the path in the I/O error
pub fn read_to_string(path: &Path) -> StageResult<String> {
  fs::read_to_string(path).map_err(|e| with_path(e, path))
}

/// Write a file, keeping the path in the I/O error
pub fn write(path: &Path, contents: impl AsRef<[u8]>) -> StageResult<()> {
  fs::write(path, contents).map_err(|e| with_path(e, path))
}

/// Attach the offending path to an I/O error without changing its kind
pub fn with_path(err: io::Error, path: &Path) -> StageError {
  StageError::Io(io::Error::new(err.kind(), format!("{}: {}", path.display(), err)))
}

/// Remove a file or directory tree if it exists
///
/// Returns true when something was removed.
pub fn remove_if_exists(path: &Path) -> StageResult<bool> {
  let Ok(meta) = fs::symlink_metadata(path) else {
    return Ok(false);
  };

  if meta.is_dir() {
    fs::remove_dir_all(path).map_err(|e| with_path(e, path))?;
  } else {
    fs::remove_file(path).map_err(|e| with_path(e, path))?;
  }
  Ok(true)
}

/// Recursively copy a directory, excluding .git
pub fn copy_directory_recursive(source: &Path, target: &Path) -> StageResult<u64> {
  if !source.exists() {
    return Err(StageError::message(format!(
      "Source path does not exist: {}",
      source.display()
    )));
  }

  if source.is_file() {
    if let Some(parent) = target.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::copy(source, target).map_err(|e| with_path(e, source))?;
    return Ok(1);
  }

  fs::create_dir_all(target).map_err(|e| with_path(e, target))?;

  let mut copied = 0;
  for entry in fs::read_dir(source).map_err(|e| with_path(e, source))? {
    let entry = entry?;
    let file_type = entry.file_type()?;
    let file_name = entry.file_name();

    // Skip .git directory
    if file_name == ".git" {
      continue;
    }

    let source_path = entry.path();
    let target_path = target.join(&file_name);

    if file_type.is_dir() {
      copied += copy_directory_recursive(&source_path, &target_path)?;
    } else {
      fs::copy(&source_path, &target_path).map_err(|e| with_path(e, &source_path))?;
      copied += 1;
    }
  }

  Ok(copied)
}
