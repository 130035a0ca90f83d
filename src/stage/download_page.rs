//! Download page maintenance
//!
//! The page is Textile. A release table is inserted right after the
//! distribution marker heading (`h2(#dist). ...`), and links in the existing
//! content are moved to the archive since only the newest release stays on
//! the mirrors.

use super::signer::SignedArtifact;
use crate::core::config::DownloadPageConfig;
use crate::core::error::StageResult;
use crate::utils;
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;

/// The release a table is being added for
#[derive(Debug, Clone)]
pub struct PageRelease<'a> {
  pub project: &'a str,
  pub version: &'a str,
  pub date: NaiveDate,
}

pub struct DownloadPageUpdater<'a> {
  config: &'a DownloadPageConfig,
}

fn join_url(prefix: &str, parts: &[&str]) -> String {
  let mut url = prefix.trim_end_matches('/').to_string();
  for part in parts {
    url.push('/');
    url.push_str(part);
  }
  url
}

impl<'a> DownloadPageUpdater<'a> {
  pub fn new(config: &'a DownloadPageConfig) -> Self {
    Self { config }
  }

  /// Move official and mirror links to the archive
  fn rewrite_legacy(&self, line: &str) -> String {
    let archive = &self.config.archive_prefix;
    line
      .replace(&self.config.mirror_prefix, archive)
      .replace(&self.config.official_prefix, archive)
  }

  /// Textile block for one release
  pub fn render_block(&self, release: &PageRelease<'_>, artifacts: &[SignedArtifact]) -> String {
    let official = &self.config.official_prefix;
    let mirror = &self.config.mirror_prefix;

    let mut block = format!(
      "h3. {} {} ({})\n\n|_. Package |_. MD5 Checksum |_. PGP |\n",
      release.project,
      release.version,
      release.date.format("%Y-%m-%d")
    );

    for artifact in artifacts {
      let name = artifact.name();
      block.push_str(&format!(
        "| \"{name}\":{} | \"{}\":{} | \"Sig\":{} |\n",
        join_url(mirror, &[release.project, release.version, &name]),
        artifact.md5(),
        join_url(official, &[release.project, release.version, &format!("{}.md5", name)]),
        join_url(official, &[release.project, release.version, &format!("{}.asc", name)]),
      ));
    }

    block.push_str(&format!(
      "\np>. (\"Release signing keys\":{})\n\n",
      join_url(official, &[release.project, "KEYS"])
    ));
    block
  }

  /// Updated page text; unchanged when the page has no marker line
  pub fn update(&self, page: &str, release: &PageRelease<'_>, artifacts: &[SignedArtifact]) -> StageResult<String> {
    let marker = Regex::new(&self.config.marker)?;
    let lines: Vec<&str> = page.split_inclusive('\n').collect();

    let Some(marker_index) = lines
      .iter()
      .position(|line| marker.is_match(line.trim_end_matches(['\n', '\r'])))
    else {
      return Ok(page.to_string());
    };

    let mut updated = String::with_capacity(page.len() + 1024);
    for (index, line) in lines.iter().enumerate() {
      updated.push_str(&self.rewrite_legacy(line));
      if index == marker_index {
        if !line.ends_with('\n') {
          updated.push('\n');
        }
        updated.push_str(&self.render_block(release, artifacts));
      }
    }

    Ok(updated)
  }

  /// Update the page file in place
  ///
  /// Returns `None` when the page does not exist, otherwise whether the file
  /// changed.
  pub fn apply(&self, path: &Path, release: &PageRelease<'_>, artifacts: &[SignedArtifact]) -> StageResult<Option<bool>> {
    if !path.exists() {
      return Ok(None);
    }

    let page = utils::read_to_string(path)?;
    let updated = self.update(&page, release, artifacts)?;
    if updated == page {
      return Ok(Some(false));
    }

    utils::write(path, updated)?;
    Ok(Some(true))
  }
}
