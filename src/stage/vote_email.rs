//! Release vote announcement draft

use crate::core::error::StageResult;
use crate::release::ChangelogEntry;
use crate::release::changelog;
use crate::utils;
use std::path::Path;

/// What the announcement needs to know about the candidate
#[derive(Debug, Clone)]
pub struct VoteRequest<'a> {
  /// Project name used in file names (`buildr`)
  pub project: &'a str,
  /// Project name used in prose (`Buildr`)
  pub display_name: &'a str,
  pub version: &'a str,
  /// `<dist root>/<version><rc>`
  pub dist_base: &'a str,
  pub recipient: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteEmailDraft {
  pub to: String,
  pub subject: String,
  pub body: String,
}

impl VoteEmailDraft {
  /// Full draft: headers, blank line, body
  pub fn render(&self) -> String {
    format!("To: {}\nSubject: {}\n\n{}", self.to, self.subject, self.body)
  }

  /// Write the draft, replacing any previous one
  pub fn write(&self, path: &Path) -> StageResult<()> {
    utils::write(path, self.render())
  }
}

/// Compose the vote email from the changelog
///
/// Needs the release's entry and the one below it (the previous release).
pub fn compose(request: &VoteRequest<'_>, entries: &[ChangelogEntry]) -> StageResult<VoteEmailDraft> {
  let (current, previous) = changelog::current_and_previous(entries, request.version)?;

  let base = request.dist_base.trim_end_matches('/');
  let package = format!("{}-{}", request.project, request.version);

  let changes = current
    .body
    .iter()
    .map(|line| {
      if line.trim().is_empty() {
        String::new()
      } else {
        format!("  {}", line)
      }
    })
    .collect::<Vec<_>>()
    .join("\n");

  let body = format!(
    "We're voting on the source distributions available here:\n\
     {base}/dist/\n\
     \n\
     Specifically:\n\
     {base}/dist/{package}.tgz\n\
     {base}/dist/{package}.zip\n\
     \n\
     The documentation generated for this release is available here:\n\
     {base}/site/\n\
     \n\
     The following changes were made since {previous}:\n\
     \n\
     {changes}\n",
    previous = previous.version,
  );

  Ok(VoteEmailDraft {
    to: request.recipient.to_string(),
    subject: format!("[VOTE] {} {} release", request.display_name, request.version),
    body,
  })
}
