use crate::core::error::{ConfigError, StageError, StageResult, ResultExt};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for stagehand
/// Searched in order: stage.toml, .stage.toml, .config/stage.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
  pub project: ProjectConfig,
  pub release: ReleaseConfig,
  #[serde(default)]
  pub prepare: PrepareConfig,
  #[serde(default)]
  pub build: BuildConfig,
  #[serde(default)]
  pub sign: SignConfig,
  #[serde(default)]
  pub download_page: DownloadPageConfig,
  #[serde(default)]
  pub site: SiteConfig,
  #[serde(default)]
  pub upload: UploadConfig,
  #[serde(default)]
  pub vote: VoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
  /// Short lowercase name used in file names and URLs (e.g. "buildr")
  pub name: String,

  /// Name used in prose (default: `name` capitalized)
  #[serde(default)]
  pub display_name: Option<String>,
}

impl ProjectConfig {
  pub fn display_name(&self) -> String {
    if let Some(ref name) = self.display_name {
      return name.clone();
    }
    let mut chars = self.name.chars();
    match chars.next() {
      Some(first) => first.to_uppercase().chain(chars).collect(),
      None => String::new(),
    }
  }
}

/// The release being staged
///
/// # Example
///
/// ```toml
/// [release]
/// version = "1.2.3"
/// precision = 3
/// version_file = "lib/buildr/version.rb"
/// changelog = "CHANGELOG"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Release version as declared (may carry a suffix like ".dev")
  pub version: String,

  /// Number of numeric components in the base version
  #[serde(default = "default_precision")]
  pub precision: usize,

  /// Source file holding `VERSION = "..."` (optional)
  #[serde(default)]
  pub version_file: Option<PathBuf>,

  /// Changelog document, most recent entry first
  #[serde(default = "default_changelog")]
  pub changelog: PathBuf,
}

fn default_precision() -> usize {
  3
}

fn default_changelog() -> PathBuf {
  PathBuf::from("CHANGELOG")
}

/// A delegated precondition (license audit, addon checks)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalCheckConfig {
  pub name: String,
  pub command: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareConfig {
  /// External checks run in declaration order
  #[serde(default)]
  pub checks: Vec<ExternalCheckConfig>,

  /// Tools that must answer `<tool> --version` (default: ["prince"])
  #[serde(default = "default_required_tools")]
  pub required_tools: Vec<String>,

  #[serde(default)]
  pub platform: PlatformConfig,
}

fn default_required_tools() -> Vec<String> {
  vec!["prince".to_string()]
}

impl Default for PrepareConfig {
  fn default() -> Self {
    Self {
      checks: Vec::new(),
      required_tools: default_required_tools(),
      platform: PlatformConfig::default(),
    }
  }
}

/// Host runtime gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
  /// Runtime to interrogate with `--version` (None = gate disabled)
  #[serde(default)]
  pub runtime: Option<String>,

  /// Minimum runtime version (e.g. "1.9.0")
  #[serde(default)]
  pub min_version: Option<String>,

  /// Runtime variants that must not be used (matched case-insensitively)
  #[serde(default = "default_forbidden_variants")]
  pub forbidden_variants: Vec<String>,
}

fn default_forbidden_variants() -> Vec<String> {
  vec!["jruby".to_string()]
}

impl Default for PlatformConfig {
  fn default() -> Self {
    Self {
      runtime: None,
      min_version: None,
      forbidden_variants: default_forbidden_variants(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
  /// Packaging command (empty = packages are built out of band)
  #[serde(default)]
  pub command: Vec<String>,

  /// Globs, relative to the workspace root, matching the built packages
  #[serde(default = "default_artifacts")]
  pub artifacts: Vec<String>,
}

fn default_artifacts() -> Vec<String> {
  vec!["pkg/*.tgz".to_string(), "pkg/*.zip".to_string(), "pkg/*.gem".to_string()]
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      command: Vec::new(),
      artifacts: default_artifacts(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignConfig {
  /// Signing program (gpg-compatible command line)
  #[serde(default = "default_sign_program")]
  pub program: String,

  /// Signer identity (overridden by --gpg-user / GPG_USER)
  #[serde(default)]
  pub user: Option<String>,
}

fn default_sign_program() -> String {
  "gpg".to_string()
}

impl Default for SignConfig {
  fn default() -> Self {
    Self {
      program: default_sign_program(),
      user: None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadPageConfig {
  /// Page to update (skipped with a warning when the file is absent)
  #[serde(default = "default_page_path")]
  pub path: PathBuf,

  /// Regex matching the line after which the release table is inserted
  #[serde(default = "default_page_marker")]
  pub marker: String,

  #[serde(default = "default_official_prefix")]
  pub official_prefix: String,

  #[serde(default = "default_mirror_prefix")]
  pub mirror_prefix: String,

  #[serde(default = "default_archive_prefix")]
  pub archive_prefix: String,
}

fn default_page_path() -> PathBuf {
  PathBuf::from("doc/download.textile")
}

fn default_page_marker() -> String {
  r"^h2\(#dist\)".to_string()
}

fn default_official_prefix() -> String {
  "https://www.apache.org/dist/".to_string()
}

fn default_mirror_prefix() -> String {
  "https://www.apache.org/dyn/closer.cgi/".to_string()
}

fn default_archive_prefix() -> String {
  "https://archive.apache.org/dist/".to_string()
}

impl Default for DownloadPageConfig {
  fn default() -> Self {
    Self {
      path: default_page_path(),
      marker: default_page_marker(),
      official_prefix: default_official_prefix(),
      mirror_prefix: default_mirror_prefix(),
      archive_prefix: default_archive_prefix(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
  /// Site generation command (empty = no site is bundled)
  #[serde(default)]
  pub command: Vec<String>,

  /// Directory the site command writes to
  #[serde(default = "default_site_output")]
  pub output: PathBuf,
}

fn default_site_output() -> PathBuf {
  PathBuf::from("_site")
}

impl Default for SiteConfig {
  fn default() -> Self {
    Self {
      command: Vec::new(),
      output: default_site_output(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
  /// Distribution repository client (svn-compatible command line)
  #[serde(default = "default_upload_program")]
  pub program: String,

  /// Remote root under which `<version><rc>` is created
  /// (default: https://dist.apache.org/repos/dist/dev/<project>)
  #[serde(default)]
  pub dist_root: Option<String>,
}

fn default_upload_program() -> String {
  "svn".to_string()
}

impl Default for UploadConfig {
  fn default() -> Self {
    Self {
      program: default_upload_program(),
      dist_root: None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteConfig {
  /// Recipient list (default: dev@<project>.apache.org)
  #[serde(default)]
  pub to: Option<String>,

  /// Where the draft is written (overwritten on every run)
  #[serde(default = "default_draft_path")]
  pub draft: PathBuf,
}

fn default_draft_path() -> PathBuf {
  PathBuf::from("_vote-email")
}

impl Default for VoteConfig {
  fn default() -> Self {
    Self {
      to: None,
      draft: default_draft_path(),
    }
  }
}

impl StageConfig {
  /// Find config file in search order: stage.toml, .stage.toml, .config/stage.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("stage.toml"),
      path.join(".stage.toml"),
      path.join(".config").join("stage.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from stage.toml (searches multiple locations)
  pub fn load(path: &Path) -> StageResult<Self> {
    let config_path = Self::find_config_path(path).ok_or_else(|| {
      StageError::Config(ConfigError::NotFound {
        workspace_root: path.to_path_buf(),
      })
    })?;

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Parse and validate configuration text
  pub fn parse(content: &str) -> StageResult<Self> {
    let config: StageConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Save config to stage.toml (default location)
  pub fn save(&self, path: &Path) -> StageResult<PathBuf> {
    let config_path = path.join("stage.toml");
    let content = toml_edit::ser::to_string_pretty(self)
      .map_err(|e| StageError::message(format!("Failed to serialize config to TOML: {}", e)))?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(config_path)
  }

  /// Create a config with defaults for every optional section
  pub fn new(project: impl Into<String>, version: impl Into<String>) -> Self {
    Self {
      project: ProjectConfig {
        name: project.into(),
        display_name: None,
      },
      release: ReleaseConfig {
        version: version.into(),
        precision: default_precision(),
        version_file: None,
        changelog: default_changelog(),
      },
      prepare: PrepareConfig::default(),
      build: BuildConfig::default(),
      sign: SignConfig::default(),
      download_page: DownloadPageConfig::default(),
      site: SiteConfig::default(),
      upload: UploadConfig::default(),
      vote: VoteConfig::default(),
    }
  }

  /// Validate field-level constraints
  pub fn validate(&self) -> StageResult<()> {
    if self.project.name.trim().is_empty() {
      return Err(ConfigError::MissingField {
        field: "project.name".to_string(),
      }
      .into());
    }

    if self.release.version.trim().is_empty() {
      return Err(ConfigError::MissingField {
        field: "release.version".to_string(),
      }
      .into());
    }

    if !(1..=3).contains(&self.release.precision) {
      return Err(invalid("release.precision", "must be 1, 2, or 3"));
    }

    for check in &self.prepare.checks {
      if check.command.is_empty() {
        return Err(invalid(&format!("prepare.checks.{}", check.name), "command must not be empty"));
      }
    }

    if let Some(ref min) = self.prepare.platform.min_version
      && semver::Version::parse(min).is_err()
    {
      return Err(invalid(
        "prepare.platform.min_version",
        &format!("'{}' is not a full version (e.g. '1.9.0')", min),
      ));
    }

    if let Err(e) = regex::Regex::new(&self.download_page.marker) {
      return Err(invalid("download_page.marker", &e.to_string()));
    }

    for pattern in &self.build.artifacts {
      if let Err(e) = glob::Pattern::new(pattern) {
        return Err(invalid("build.artifacts", &format!("'{}': {}", pattern, e)));
      }
    }

    Ok(())
  }

  /// Remote distribution root for this project
  pub fn dist_root(&self) -> String {
    self
      .upload
      .dist_root
      .clone()
      .unwrap_or_else(|| format!("https://dist.apache.org/repos/dist/dev/{}", self.project.name))
      .trim_end_matches('/')
      .to_string()
  }

  /// Vote mailing list for this project
  pub fn vote_recipient(&self) -> String {
    self
      .vote
      .to
      .clone()
      .unwrap_or_else(|| format!("dev@{}.apache.org", self.project.name))
  }
}

fn invalid(field: &str, reason: &str) -> StageError {
  StageError::Config(ConfigError::Invalid {
    field: field.to_string(),
    reason: reason.to_string(),
  })
}

/// Per-run values supplied by the operator (flags or environment)
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
  pub stage_date: Option<String>,
  pub rc: Option<String>,
  pub signer: Option<String>,
  pub passphrase: Option<String>,
}

/// Values resolved once per run and threaded through every step
#[derive(Clone)]
pub struct RunSettings {
  /// Date the release is staged (changelog header and download page)
  pub stage_date: NaiveDate,
  /// Release-candidate suffix appended to the remote directory ("" for none)
  pub rc: String,
  /// Signing identity
  pub signer: Option<String>,
  /// Passphrase for non-interactive signing
  pub passphrase: Option<String>,
}

impl RunSettings {
  /// Resolve settings: explicit overrides first, then config, then defaults
  pub fn resolve(overrides: &SettingsOverrides, config: &StageConfig, today: NaiveDate) -> StageResult<Self> {
    let stage_date = match overrides.stage_date.as_deref().map(str::trim) {
      Some(date) if !date.is_empty() => NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| invalid("stage date", &format!("'{}' is not YYYY-MM-DD ({})", date, e)))?,
      _ => today,
    };

    let signer = overrides
      .signer
      .clone()
      .or_else(|| config.sign.user.clone())
      .filter(|s| !s.trim().is_empty());

    Ok(Self {
      stage_date,
      rc: overrides.rc.clone().unwrap_or_default(),
      signer,
      passphrase: overrides.passphrase.clone().filter(|p| !p.is_empty()),
    })
  }

  /// Stage date in ISO-8601 form
  pub fn stage_date_iso(&self) -> String {
    self.stage_date.format("%Y-%m-%d").to_string()
  }
}

impl fmt::Debug for RunSettings {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RunSettings")
      .field("stage_date", &self.stage_date)
      .field("rc", &self.rc)
      .field("signer", &self.signer)
      .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}
