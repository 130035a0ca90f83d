//! Changelog parsing
//!
//! The changelog is a plain-text document, most recent release first:
//!
//! ```text
//! 1.2.3 (2024-05-01)
//! * Fixed: something
//! * Added: something else
//!
//! 1.2.2 (2024-01-10)
//! * Fixed: an older thing
//! ```
//!
//! Each header line `<version> (<yyyy-mm-dd>)` opens an entry whose body runs
//! until the next header. Text before the first header is ignored.

use crate::core::error::{DataError, StageResult};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^([0-9]+\.[0-9]+(?:\.[0-9]+)?)\s+\(([0-9]{4}-[0-9]{2}-[0-9]{2})\)").expect("header pattern is valid")
});

/// One release section of the changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
  pub version: String,
  pub date: NaiveDate,
  /// Body lines in document order, trailing blank lines removed
  pub body: Vec<String>,
}

impl ChangelogEntry {
  /// `<version> (<yyyy-mm-dd>)`
  pub fn header_line(&self) -> String {
    header_line(&self.version, self.date)
  }

  /// Text for `_staged/CHANGES`: header then body, newline-terminated
  pub fn render(&self) -> String {
    let mut out = self.header_line();
    out.push('\n');
    for line in &self.body {
      out.push_str(line);
      out.push('\n');
    }
    out
  }
}

/// Header line the changelog must open with for a release
pub fn header_line(version: &str, date: NaiveDate) -> String {
  format!("{} ({})", version, date.format("%Y-%m-%d"))
}

fn parse_header(line: &str) -> Option<(String, NaiveDate)> {
  let caps = HEADER.captures(line)?;
  let version = caps.get(1)?.as_str().to_string();
  let date_text = caps.get(2)?.as_str();
  match NaiveDate::parse_from_str(date_text, "%Y-%m-%d") {
    Ok(date) => Some((version, date)),
    Err(e) => {
      debug!(line, error = %e, "header-like line with invalid date treated as body");
      None
    }
  }
}

fn finish(mut entry: ChangelogEntry, entries: &mut Vec<ChangelogEntry>) {
  while entry.body.last().is_some_and(|l| l.trim().is_empty()) {
    entry.body.pop();
  }
  entries.push(entry);
}

/// Split a changelog document into entries, preserving document order
pub fn extract_entries(document: &str) -> Vec<ChangelogEntry> {
  let mut entries = Vec::new();
  let mut current: Option<ChangelogEntry> = None;

  for line in document.lines() {
    if let Some((version, date)) = parse_header(line) {
      if let Some(done) = current.take() {
        finish(done, &mut entries);
      }
      current = Some(ChangelogEntry {
        version,
        date,
        body: Vec::new(),
      });
    } else if let Some(ref mut entry) = current {
      entry.body.push(line.to_string());
    }
  }

  if let Some(done) = current {
    finish(done, &mut entries);
  }

  entries
}

/// Entry for a version, if present
pub fn find_entry<'a>(entries: &'a [ChangelogEntry], version: &str) -> Option<&'a ChangelogEntry> {
  entries.iter().find(|e| e.version == version)
}

/// Entry for a version, or `NoChangesetFound`
pub fn require_entry<'a>(entries: &'a [ChangelogEntry], version: &str) -> StageResult<&'a ChangelogEntry> {
  find_entry(entries, version).ok_or_else(|| {
    DataError::NoChangesetFound {
      version: version.to_string(),
    }
    .into()
  })
}

/// The entry for `version` and the one right after it (the previous release)
pub fn current_and_previous<'a>(
  entries: &'a [ChangelogEntry],
  version: &str,
) -> StageResult<(&'a ChangelogEntry, &'a ChangelogEntry)> {
  let index = entries.iter().position(|e| e.version == version).ok_or_else(|| DataError::NoChangesetFound {
    version: version.to_string(),
  })?;

  let previous = entries.get(index + 1).ok_or_else(|| DataError::PreviousVersionMissing {
    version: version.to_string(),
  })?;

  Ok((&entries[index], previous))
}
