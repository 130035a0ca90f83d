//! Run context - resolved once, passed everywhere
//!
//! ```text
//! main.rs:
//!   StageContext::build() -> &StageContext
//!   |
//!   v
//! commands/prepare.rs, stage.rs, check.rs:
//!   fn run_*(ctx: &StageContext, ...)
//! ```

use crate::core::config::{RunSettings, SettingsOverrides, StageConfig};
use crate::core::error::StageResult;
use crate::release::ReleaseVersion;
use std::path::{Path, PathBuf};

/// Name of the staging directory under the workspace root
pub const STAGING_DIR: &str = "_staged";

/// Everything a staging run needs to know, resolved before the first step
#[derive(Debug, Clone)]
pub struct StageContext {
  /// Workspace root directory (absolute path)
  pub root: PathBuf,

  /// Configuration (stage.toml)
  pub config: StageConfig,

  /// Per-run settings (stage date, RC suffix, signer)
  pub settings: RunSettings,

  /// Declared release version
  pub version: ReleaseVersion,
}

impl StageContext {
  /// Load stage.toml and resolve run settings against today's date
  pub fn build(workspace_root: &Path, overrides: &SettingsOverrides) -> StageResult<Self> {
    let config = StageConfig::load(workspace_root)?;
    let today = chrono::Local::now().date_naive();
    let settings = RunSettings::resolve(overrides, &config, today)?;
    Self::from_parts(workspace_root, config, settings)
  }

  /// Assemble a context from already-resolved parts
  pub fn from_parts(workspace_root: &Path, config: StageConfig, settings: RunSettings) -> StageResult<Self> {
    let version = ReleaseVersion::parse(&config.release.version)?;
    Ok(Self {
      root: workspace_root.to_path_buf(),
      config,
      settings,
      version,
    })
  }

  /// Base version every artifact, header, and URL is named after
  pub fn release_version(&self) -> String {
    self.version.base_version(self.config.release.precision)
  }

  /// `<version><rc>`, the remote directory name
  pub fn candidate_name(&self) -> String {
    format!("{}{}", self.release_version(), self.settings.rc)
  }

  /// `<dist root>/<version><rc>`
  pub fn candidate_url(&self) -> String {
    format!("{}/{}", self.config.dist_root(), self.candidate_name())
  }

  fn resolve(&self, path: &Path) -> PathBuf {
    if path.is_absolute() {
      path.to_path_buf()
    } else {
      self.root.join(path)
    }
  }

  pub fn staging_dir(&self) -> PathBuf {
    self.root.join(STAGING_DIR)
  }

  pub fn dist_dir(&self) -> PathBuf {
    self.staging_dir().join("dist")
  }

  pub fn changes_file(&self) -> PathBuf {
    self.staging_dir().join("CHANGES")
  }

  pub fn staged_site_dir(&self) -> PathBuf {
    self.staging_dir().join("site")
  }

  pub fn changelog_path(&self) -> PathBuf {
    self.resolve(&self.config.release.changelog)
  }

  pub fn version_file(&self) -> Option<PathBuf> {
    self.config.release.version_file.as_deref().map(|p| self.resolve(p))
  }

  pub fn download_page_path(&self) -> PathBuf {
    self.resolve(&self.config.download_page.path)
  }

  pub fn site_output_dir(&self) -> PathBuf {
    self.resolve(&self.config.site.output)
  }

  pub fn vote_draft_path(&self) -> PathBuf {
    self.resolve(&self.config.vote.draft)
  }
}
