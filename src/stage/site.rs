//! Site bundling into `_staged/site`

use super::build::run_task;
use crate::core::error::{StageError, StageResult};
use crate::utils;
use std::io;
use std::path::Path;

/// Run the site command and copy its output into `target`
///
/// Nothing is copied when the command fails. A missing output directory
/// after a successful run is an I/O error.
pub fn bundle(command: &[String], root: &Path, output_dir: &Path, target: &Path) -> StageResult<u64> {
  run_task("site", command, root)?;

  if !output_dir.is_dir() {
    return Err(StageError::Io(io::Error::new(
      io::ErrorKind::NotFound,
      format!("site output directory not found: {}", output_dir.display()),
    )));
  }

  utils::copy_directory_recursive(output_dir, target)
}
