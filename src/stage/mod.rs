//! The staging pipeline
//!
//! Two phases, run strictly in order:
//!
//! ```text
//! prepare:  version sync -> preconditions (fail-fast)
//! stage:    clobber -> permissions -> changes -> build -> artifacts
//!           -> download page -> site -> upload -> vote email
//! ```
//!
//! `stage` requires a successful `prepare`. The first failing step aborts the
//! run, moves the pipeline to [`PipelineState::Failed`], and is reported with
//! a `phase/step` tag. Completed steps are not rolled back; rerunning starts
//! from a clobbered staging directory.

pub mod build;
pub mod collector;
pub mod download_page;
pub mod permissions;
pub mod signer;
pub mod site;
pub mod upload;
pub mod vote_email;

use crate::checks::create_precondition_runner;
use crate::core::context::StageContext;
use crate::core::error::{ConfigError, StageError, StageResult};
use crate::release::{ChangelogEntry, changelog, version};
use crate::utils;
use download_page::{DownloadPageUpdater, PageRelease};
use serde::Serialize;
use signer::{ChecksumSigner, SignedArtifact};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};
use upload::DistributionUploader;
use vote_email::{VoteEmailDraft, VoteRequest};

/// Where the pipeline is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
  Idle,
  Preparing,
  Prepared,
  Staging,
  Staged,
  Failed,
}

/// Steps of the stage phase, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStep {
  Clobber,
  Permissions,
  Changes,
  Build,
  Artifacts,
  DownloadPage,
  Site,
  Upload,
  VoteEmail,
}

impl StageStep {
  pub const ALL: [StageStep; 9] = [
    StageStep::Clobber,
    StageStep::Permissions,
    StageStep::Changes,
    StageStep::Build,
    StageStep::Artifacts,
    StageStep::DownloadPage,
    StageStep::Site,
    StageStep::Upload,
    StageStep::VoteEmail,
  ];

  pub fn name(self) -> &'static str {
    match self {
      StageStep::Clobber => "clobber",
      StageStep::Permissions => "permissions",
      StageStep::Changes => "changes",
      StageStep::Build => "build",
      StageStep::Artifacts => "artifacts",
      StageStep::DownloadPage => "download-page",
      StageStep::Site => "site",
      StageStep::Upload => "upload",
      StageStep::VoteEmail => "vote-email",
    }
  }

  fn position(self) -> usize {
    Self::ALL.iter().position(|s| *s == self).unwrap_or(0) + 1
  }
}

impl fmt::Display for StageStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

/// One line of the dry-run plan
#[derive(Debug, Clone, Serialize)]
pub struct PlannedStep {
  pub step: StageStep,
  pub detail: String,
  pub skipped: bool,
}

/// What a completed stage run produced
#[derive(Debug)]
pub struct StageReport {
  pub changes_file: PathBuf,
  pub artifacts: Vec<SignedArtifact>,
  /// `None` when the page file does not exist
  pub download_page_updated: Option<bool>,
  /// `None` when no site command is configured
  pub site_files: Option<u64>,
  pub vote_email: VoteEmailDraft,
  pub vote_email_path: PathBuf,
}

/// Remove the staging directory and the vote draft; returns what was removed
pub fn clobber(ctx: &StageContext) -> StageResult<Vec<PathBuf>> {
  let mut removed = Vec::new();
  for path in [ctx.staging_dir(), ctx.vote_draft_path()] {
    if utils::remove_if_exists(&path)? {
      removed.push(path);
    }
  }
  Ok(removed)
}

/// Sequences prepare and stage for one run
pub struct StagingPipeline<'a> {
  ctx: &'a StageContext,
  state: PipelineState,
  quiet: bool,
}

impl<'a> StagingPipeline<'a> {
  pub fn new(ctx: &'a StageContext) -> Self {
    Self {
      ctx,
      state: PipelineState::Idle,
      quiet: false,
    }
  }

  /// Keep prepare's progress lines off stdout (for machine-readable output)
  pub fn quiet(mut self, quiet: bool) -> Self {
    self.quiet = quiet;
    self
  }

  pub fn state(&self) -> PipelineState {
    self.state
  }

  fn fail(&mut self, err: StageError, step: String) -> StageError {
    self.state = PipelineState::Failed;
    err.in_step(step)
  }

  /// Version sync, then every precondition in order
  pub fn prepare(&mut self) -> StageResult<()> {
    if self.state != PipelineState::Idle {
      return Err(StageError::message(format!(
        "prepare can only run once per pipeline (state: {:?})",
        self.state
      )));
    }

    let ctx = self.ctx;
    self.state = PipelineState::Preparing;
    info!(version = %ctx.version, "prepare");
    if let Some(suffix) = ctx.version.suffix() {
      info!(suffix, base = %ctx.release_version(), "pre-release suffix dropped for staging");
    }
    if !self.quiet {
      println!("🔍 Preparing {} {}", ctx.config.project.display_name(), ctx.release_version());
    }

    if let Some(version_file) = ctx.version_file() {
      match version::sync_version(&ctx.release_version(), &version_file) {
        Ok(true) => {
          let path = utils::display_relative(&ctx.root, &version_file);
          info!(version = %ctx.release_version(), path = %path, "version file synchronized");
          if !self.quiet {
            println!("   ✏️  Set VERSION to {} in {}", ctx.release_version(), path);
          }
        }
        Ok(false) => {}
        Err(err) => return Err(self.fail(err, "prepare/version".to_string())),
      }
    }

    // Tags are applied by the runner
    if let Err(err) = create_precondition_runner(&ctx.config).validate(ctx, self.quiet) {
      self.state = PipelineState::Failed;
      return Err(err);
    }

    self.state = PipelineState::Prepared;
    Ok(())
  }

  fn run_step<T>(&mut self, step: StageStep, f: impl FnOnce() -> StageResult<T>) -> StageResult<T> {
    info!(step = step.name(), "stage step");
    println!("\n📦 [{}/{}] {}", step.position(), StageStep::ALL.len(), step);
    f().map_err(|err| self.fail(err, format!("stage/{}", step)))
  }

  /// Run every staging step; requires a successful `prepare`
  pub fn stage(&mut self) -> StageResult<StageReport> {
    if self.state != PipelineState::Prepared {
      return Err(StageError::with_help(
        format!("Cannot stage from state {:?}", self.state),
        "Staging runs only after a successful prepare.",
      ));
    }

    let ctx = self.ctx;
    self.state = PipelineState::Staging;

    let Some(signer_id) = ctx.settings.signer.clone() else {
      let err = StageError::Config(ConfigError::MissingField {
        field: "sign.user".to_string(),
      });
      return Err(self.fail(err, "stage".to_string()));
    };
    let signer = ChecksumSigner::new(&ctx.config.sign.program, signer_id, ctx.settings.passphrase.clone());
    let release_version = ctx.release_version();

    self.run_step(StageStep::Clobber, || {
      for path in clobber(ctx)? {
        println!("   🗑️  Removed {}", utils::display_relative(&ctx.root, &path));
      }
      Ok(())
    })?;

    self.run_step(StageStep::Permissions, || {
      let changed = permissions::normalize(&ctx.root)?;
      println!("   Adjusted permissions on {} entries", changed);
      Ok(())
    })?;

    let (entries, changes_file) = self.run_step(StageStep::Changes, || write_changes(ctx, &release_version))?;

    self.run_step(StageStep::Build, || {
      if ctx.config.build.command.is_empty() {
        println!("   ⏭️  No [build] command configured; using existing packages");
        return Ok(());
      }
      build::run_task("build", &ctx.config.build.command, &ctx.root)
    })?;

    let artifacts = self.run_step(StageStep::Artifacts, || {
      let artifacts = collector::collect(&ctx.root, &ctx.config.build.artifacts, &ctx.dist_dir(), &signer)?;
      for artifact in &artifacts {
        println!("   ✅ {}", utils::display_relative(&ctx.root, &artifact.path));
      }
      Ok(artifacts)
    })?;

    let download_page_updated = self.run_step(StageStep::DownloadPage, || {
      let page = ctx.download_page_path();
      let release = PageRelease {
        project: &ctx.config.project.name,
        version: &release_version,
        date: ctx.settings.stage_date,
      };
      let updated = DownloadPageUpdater::new(&ctx.config.download_page).apply(&page, &release, &artifacts)?;
      match updated {
        None => {
          warn!(page = %page.display(), "download page not found, skipping");
          println!(
            "   ⚠️  {} not found; skipping",
            utils::display_relative(&ctx.root, &page)
          );
        }
        Some(true) => println!("   Updated {}", utils::display_relative(&ctx.root, &page)),
        Some(false) => println!("   {} has no distribution marker; left unchanged", utils::display_relative(&ctx.root, &page)),
      }
      Ok(updated)
    })?;

    let site_files = self.run_step(StageStep::Site, || {
      if ctx.config.site.command.is_empty() {
        println!("   ⏭️  No [site] command configured; skipping");
        return Ok(None);
      }
      let copied = site::bundle(
        &ctx.config.site.command,
        &ctx.root,
        &ctx.site_output_dir(),
        &ctx.staged_site_dir(),
      )?;
      println!("   Copied {} site files", copied);
      Ok(Some(copied))
    })?;

    self.run_step(StageStep::Upload, || {
      let url = ctx.candidate_url();
      let message = format!("Staging {} {}", ctx.config.project.display_name(), ctx.candidate_name());
      DistributionUploader::new(&ctx.config.upload.program).upload(&ctx.staging_dir(), &url, &message)?;
      println!("   ✅ Committed to {}", url);
      Ok(())
    })?;

    let (vote_email, vote_email_path) = self.run_step(StageStep::VoteEmail, || {
      let display_name = ctx.config.project.display_name();
      let dist_base = ctx.candidate_url();
      let recipient = ctx.config.vote_recipient();
      let request = VoteRequest {
        project: &ctx.config.project.name,
        display_name: &display_name,
        version: &release_version,
        dist_base: &dist_base,
        recipient: &recipient,
      };
      let draft = vote_email::compose(&request, &entries)?;
      let path = ctx.vote_draft_path();
      draft.write(&path)?;
      Ok((draft, path))
    })?;

    self.state = PipelineState::Staged;
    Ok(StageReport {
      changes_file,
      artifacts,
      download_page_updated,
      site_files,
      vote_email,
      vote_email_path,
    })
  }

  /// What `stage` would do, without doing it
  pub fn plan(&self) -> Vec<PlannedStep> {
    let ctx = self.ctx;
    let rel = |p: &std::path::Path| utils::display_relative(&ctx.root, p);
    let planned = |step, detail: String, skipped| PlannedStep { step, detail, skipped };

    let page = ctx.download_page_path();
    let signer = ctx.settings.signer.as_deref().unwrap_or("<missing signer>");

    StageStep::ALL
      .iter()
      .map(|&step| match step {
        StageStep::Clobber => planned(
          step,
          format!("remove {} and {}", rel(&ctx.staging_dir()), rel(&ctx.vote_draft_path())),
          false,
        ),
        StageStep::Permissions => planned(step, "grant group/other read access to workspace files".to_string(), false),
        StageStep::Changes => planned(
          step,
          format!(
            "write {} from the {} entry in {}",
            rel(&ctx.changes_file()),
            ctx.release_version(),
            rel(&ctx.changelog_path())
          ),
          false,
        ),
        StageStep::Build if ctx.config.build.command.is_empty() => {
          planned(step, "no [build] command configured".to_string(), true)
        }
        StageStep::Build => planned(step, format!("run `{}`", ctx.config.build.command.join(" ")), false),
        StageStep::Artifacts => planned(
          step,
          format!(
            "copy {} into {}, write .md5/.sha1, sign as {}",
            ctx.config.build.artifacts.join(", "),
            rel(&ctx.dist_dir()),
            signer
          ),
          false,
        ),
        StageStep::DownloadPage if !page.exists() => planned(step, format!("{} not found", rel(&page)), true),
        StageStep::DownloadPage => planned(step, format!("add release table to {}", rel(&page)), false),
        StageStep::Site if ctx.config.site.command.is_empty() => {
          planned(step, "no [site] command configured".to_string(), true)
        }
        StageStep::Site => planned(
          step,
          format!(
            "run `{}`, copy {} into {}",
            ctx.config.site.command.join(" "),
            rel(&ctx.site_output_dir()),
            rel(&ctx.staged_site_dir())
          ),
          false,
        ),
        StageStep::Upload => planned(
          step,
          format!("{} mkdir/checkout/add/commit {}", ctx.config.upload.program, ctx.candidate_url()),
          false,
        ),
        StageStep::VoteEmail => planned(
          step,
          format!("write {} for {}", rel(&ctx.vote_draft_path()), ctx.config.vote_recipient()),
          false,
        ),
      })
      .collect()
  }

  #[cfg(test)]
  pub(crate) fn assume_prepared(&mut self) {
    self.state = PipelineState::Prepared;
  }
}

/// Find this release's changelog entry and write `_staged/CHANGES`
fn write_changes(ctx: &StageContext, release_version: &str) -> StageResult<(Vec<ChangelogEntry>, PathBuf)> {
  let document = utils::read_to_string(&ctx.changelog_path())?;
  let entries = changelog::extract_entries(&document);
  let entry = changelog::require_entry(&entries, release_version)?;

  let staging = ctx.staging_dir();
  fs::create_dir_all(&staging).map_err(|e| utils::with_path(e, &staging))?;
  let path = ctx.changes_file();
  utils::write(&path, entry.render())?;
  println!("   Wrote {}", utils::display_relative(&ctx.root, &path));

  Ok((entries, path))
}
