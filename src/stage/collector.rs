//! Artifact collection into `_staged/dist`

use super::signer::{ChecksumSigner, SignedArtifact};
use crate::core::error::{StageError, StageResult};
use crate::ui::progress::FileProgress;
use crate::utils;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files matched by the artifact globs, de-duplicated and sorted
///
/// Patterns are relative to `root`. A file matched by several patterns is
/// returned once; two different files with the same base name are an error
/// since they would collide in the flat dist directory.
pub fn discover(root: &Path, patterns: &[String]) -> StageResult<Vec<PathBuf>> {
  let escaped_root = glob::Pattern::escape(&root.to_string_lossy());
  let mut matched = BTreeSet::new();

  for pattern in patterns {
    let full = if Path::new(pattern).is_absolute() {
      pattern.clone()
    } else {
      format!("{}/{}", escaped_root.trim_end_matches('/'), pattern)
    };

    for entry in glob::glob(&full)? {
      let path = entry?;
      if path.is_file() {
        matched.insert(path);
      }
    }
  }

  let mut by_name: BTreeMap<String, &PathBuf> = BTreeMap::new();
  for path in &matched {
    let name = utils::file_name(path)?;
    if let Some(existing) = by_name.insert(name.clone(), path) {
      return Err(StageError::with_help(
        format!(
          "Two artifacts share the name '{}': {} and {}",
          name,
          utils::display_relative(root, existing),
          utils::display_relative(root, path)
        ),
        "Narrow the [build] artifacts globs so each package is matched once.",
      ));
    }
  }

  Ok(matched.into_iter().collect())
}

/// Copy matched artifacts into `dist_dir` and sign each copy
pub fn collect(
  root: &Path,
  patterns: &[String],
  dist_dir: &Path,
  signer: &ChecksumSigner,
) -> StageResult<Vec<SignedArtifact>> {
  let sources = discover(root, patterns)?;
  if sources.is_empty() {
    return Err(StageError::with_help(
      format!("No build artifacts matched {}", patterns.join(", ")),
      "Check that the build produced packages and that [build] artifacts points at them.",
    ));
  }

  fs::create_dir_all(dist_dir).map_err(|e| utils::with_path(e, dist_dir))?;

  let mut staged = Vec::with_capacity(sources.len());
  for source in &sources {
    let target = dist_dir.join(utils::file_name(source)?);
    fs::copy(source, &target).map_err(|e| utils::with_path(e, source))?;
    debug!(from = %source.display(), to = %target.display(), "staged artifact");
    staged.push(target);
  }

  // Interactive signing prompts on the terminal; a bar would garble them
  let mut progress = signer
    .is_batch()
    .then(|| FileProgress::new(staged.len(), "Signing artifacts"));

  let mut signed = Vec::with_capacity(staged.len());
  for artifact in &staged {
    signed.push(signer.sign(artifact)?);
    if let Some(ref mut bar) = progress {
      bar.inc();
    }
  }

  Ok(signed)
}
