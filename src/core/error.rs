//! Error types for stagehand with contextual messages and exit codes
//!
//! Every failure in a staging run is classified into one category so the
//! operator sees exactly one root cause and the process exits with a code that
//! tells scripts which kind of problem occurred:
//!
//! - **Precondition**: the workspace is not ready (dirty tree, changelog header,
//!   external checks, missing tools, platform). Fixable by the operator.
//! - **Data**: the changelog or version data is malformed.
//! - **Tool**: an external command (build, gpg, svn, site) exited non-zero.
//! - **Io**: file system failures, surfaced verbatim.
//! - **Config**: `stage.toml` or run settings are missing or invalid.
//!
//! The orchestrator wraps failures in [`StageError::Step`] to record which
//! phase and step produced them; nothing else is translated.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for stagehand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (external tools, I/O)
  System = 2,
  /// Validation failure (preconditions)
  Validation = 3,
  /// Malformed changelog or version data
  Data = 4,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for stagehand
#[derive(Debug)]
pub enum StageError {
  /// Configuration errors
  Config(ConfigError),

  /// Precondition gate failures
  Precondition(PreconditionError),

  /// Changelog / version data errors
  Data(DataError),

  /// External tool failures
  Tool(ToolError),

  /// I/O errors
  Io(io::Error),

  /// A failure tagged with the pipeline phase and step that produced it
  Step { step: String, source: Box<StageError> },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl StageError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    StageError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    StageError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Tag this error with the step that produced it
  pub fn in_step(self, step: impl Into<String>) -> Self {
    StageError::Step {
      step: step.into(),
      source: Box::new(self),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      StageError::Message { message, context, help } => StageError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// The innermost error, with step tags removed
  pub fn root_cause(&self) -> &StageError {
    match self {
      StageError::Step { source, .. } => source.root_cause(),
      other => other,
    }
  }

  /// Short, stable name of the error kind (used in JSON output and tests)
  pub fn kind(&self) -> &'static str {
    match self.root_cause() {
      StageError::Config(_) => "ConfigError",
      StageError::Precondition(e) => e.kind(),
      StageError::Data(e) => e.kind(),
      StageError::Tool(e) => e.kind(),
      StageError::Io(_) => "IOError",
      StageError::Message { .. } | StageError::Step { .. } => "Error",
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self.root_cause() {
      StageError::Config(_) => ExitCode::User,
      StageError::Precondition(_) => ExitCode::Validation,
      StageError::Data(_) => ExitCode::Data,
      StageError::Tool(_) => ExitCode::System,
      StageError::Io(_) => ExitCode::System,
      StageError::Message { .. } | StageError::Step { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self.root_cause() {
      StageError::Config(e) => e.help_message(),
      StageError::Precondition(e) => e.help_message(),
      StageError::Data(e) => e.help_message(),
      StageError::Tool(e) => e.help_message(),
      StageError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StageError::Config(e) => write!(f, "{}", e),
      StageError::Precondition(e) => write!(f, "{}", e),
      StageError::Data(e) => write!(f, "{}", e),
      StageError::Tool(e) => write!(f, "{}", e),
      StageError::Io(e) => write!(f, "I/O error: {}", e),
      StageError::Step { step, source } => write!(f, "[{}] {}", step, source),
      StageError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for StageError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      StageError::Io(e) => Some(e),
      StageError::Step { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for StageError {
  fn from(err: io::Error) -> Self {
    StageError::Io(err)
  }
}

impl From<String> for StageError {
  fn from(msg: String) -> Self {
    StageError::message(msg)
  }
}

impl From<&str> for StageError {
  fn from(msg: &str) -> Self {
    StageError::message(msg)
  }
}

impl From<ConfigError> for StageError {
  fn from(err: ConfigError) -> Self {
    StageError::Config(err)
  }
}

impl From<PreconditionError> for StageError {
  fn from(err: PreconditionError) -> Self {
    StageError::Precondition(err)
  }
}

impl From<DataError> for StageError {
  fn from(err: DataError) -> Self {
    StageError::Data(err)
  }
}

impl From<ToolError> for StageError {
  fn from(err: ToolError) -> Self {
    StageError::Tool(err)
  }
}

impl From<toml_edit::TomlError> for StageError {
  fn from(err: toml_edit::TomlError) -> Self {
    StageError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for StageError {
  fn from(err: toml_edit::de::Error) -> Self {
    StageError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for StageError {
  fn from(err: serde_json::Error) -> Self {
    StageError::message(format!("JSON error: {}", err))
  }
}

impl From<regex::Error> for StageError {
  fn from(err: regex::Error) -> Self {
    StageError::message(format!("Invalid pattern: {}", err))
  }
}

impl From<glob::PatternError> for StageError {
  fn from(err: glob::PatternError) -> Self {
    StageError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<glob::GlobError> for StageError {
  fn from(err: glob::GlobError) -> Self {
    StageError::message(format!("Failed to read glob match: {}", err))
  }
}

impl From<chrono::ParseError> for StageError {
  fn from(err: chrono::ParseError) -> Self {
    StageError::message(format!("Date parse error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for StageError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    StageError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// stage.toml not found
  NotFound { workspace_root: PathBuf },

  /// Missing required field or run setting
  MissingField { field: String },

  /// Field present but unusable
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Run `stagehand init` to create a configuration file.".to_string()),
      ConfigError::MissingField { field } if field == "sign.user" => {
        Some("Pass --gpg-user, export GPG_USER, or set `user` under [sign] in stage.toml.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { workspace_root } => {
        write!(
          f,
          "No stagehand configuration found.\nExpected file: {}/stage.toml",
          workspace_root.display()
        )
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required setting: {}", field)
      }
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid setting '{}': {}", field, reason)
      }
    }
  }
}

/// Precondition gate failures (recoverable by the operator, never retried)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
  /// Working tree has pending local modifications
  DirtyWorkingTree { details: String },

  /// First changelog line does not announce this release
  ChangelogHeaderMismatch { expected: String, actual: String },

  /// A delegated check (license, addons) exited non-zero
  ExternalCheckFailed { name: String },

  /// A required tool could not be invoked
  MissingTool { name: String },

  /// Host platform does not qualify
  UnsupportedPlatform { reason: String },
}

impl PreconditionError {
  pub fn kind(&self) -> &'static str {
    match self {
      PreconditionError::DirtyWorkingTree { .. } => "DirtyWorkingTree",
      PreconditionError::ChangelogHeaderMismatch { .. } => "ChangelogHeaderMismatch",
      PreconditionError::ExternalCheckFailed { .. } => "ExternalCheckFailed",
      PreconditionError::MissingTool { .. } => "MissingTool",
      PreconditionError::UnsupportedPlatform { .. } => "UnsupportedPlatform",
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      PreconditionError::DirtyWorkingTree { .. } => {
        Some("Commit or stash your changes (including the synchronized version file) and run again.".to_string())
      }
      PreconditionError::ChangelogHeaderMismatch { expected, .. } => Some(format!(
        "Make the first line of the changelog read exactly: {}",
        expected
      )),
      PreconditionError::ExternalCheckFailed { name } => {
        Some(format!("Run the '{}' check by hand to see why it failed.", name))
      }
      PreconditionError::MissingTool { name } => Some(format!("Install '{}' and make sure it is on PATH.", name)),
      PreconditionError::UnsupportedPlatform { .. } => None,
    }
  }
}

impl fmt::Display for PreconditionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PreconditionError::DirtyWorkingTree { details } => {
        write!(f, "Working tree has local modifications:\n{}", details)
      }
      PreconditionError::ChangelogHeaderMismatch { expected, actual } => {
        write!(
          f,
          "Changelog header mismatch: expected '{}', found '{}'",
          expected, actual
        )
      }
      PreconditionError::ExternalCheckFailed { name } => write!(f, "External check '{}' failed", name),
      PreconditionError::MissingTool { name } => write!(f, "Required tool '{}' is not available", name),
      PreconditionError::UnsupportedPlatform { reason } => write!(f, "Unsupported platform: {}", reason),
    }
  }
}

/// Malformed changelog or version data (not recoverable by the tool)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
  /// Changelog has no entry for the release
  NoChangesetFound { version: String },

  /// Changelog has no entry before the release
  PreviousVersionMissing { version: String },

  /// Version string cannot be parsed
  InvalidVersion { value: String, reason: String },
}

impl DataError {
  pub fn kind(&self) -> &'static str {
    match self {
      DataError::NoChangesetFound { .. } => "NoChangesetFound",
      DataError::PreviousVersionMissing { .. } => "PreviousVersionMissing",
      DataError::InvalidVersion { .. } => "InvalidVersion",
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      DataError::NoChangesetFound { version } => Some(format!(
        "Add a '{} (YYYY-MM-DD)' section to the changelog.",
        version
      )),
      DataError::PreviousVersionMissing { .. } => {
        Some("The vote email needs the previous release's changelog section to exist below this one.".to_string())
      }
      DataError::InvalidVersion { .. } => Some("Use a dotted numeric version such as 1.2.3.".to_string()),
    }
  }
}

impl fmt::Display for DataError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DataError::NoChangesetFound { version } => write!(f, "No changeset found for version {}", version),
      DataError::PreviousVersionMissing { version } => {
        write!(f, "No previous version found in changelog before {}", version)
      }
      DataError::InvalidVersion { value, reason } => write!(f, "Invalid version '{}': {}", value, reason),
    }
  }
}

/// External tool failures (never retried)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
  /// Command could not be started at all
  LaunchFailed { command: String, reason: String },

  /// Command exited non-zero
  CommandFailed {
    command: String,
    status: Option<i32>,
    stderr: String,
  },

  /// Build or site generation task failed
  ExternalBuildFailed { task: String, command: String, status: Option<i32> },

  /// Remote distribution directory already exists
  DirectoryExists { url: String },
}

impl ToolError {
  pub fn kind(&self) -> &'static str {
    match self {
      ToolError::LaunchFailed { .. } => "LaunchFailed",
      ToolError::CommandFailed { .. } => "CommandFailed",
      ToolError::ExternalBuildFailed { .. } => "ExternalBuildFailed",
      ToolError::DirectoryExists { .. } => "DirectoryExists",
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      ToolError::DirectoryExists { url } => Some(format!(
        "Remove {} or stage under a different RC suffix (--rc).",
        url
      )),
      ToolError::LaunchFailed { .. } => Some("Check that the program is installed and on PATH.".to_string()),
      _ => None,
    }
  }
}

fn describe_status(status: &Option<i32>) -> String {
  match status {
    Some(code) => format!("exit status {}", code),
    None => "terminated by signal".to_string(),
  }
}

impl fmt::Display for ToolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ToolError::LaunchFailed { command, reason } => write!(f, "Failed to run `{}`: {}", command, reason),
      ToolError::CommandFailed { command, status, stderr } => {
        write!(f, "Command `{}` failed ({})", command, describe_status(status))?;
        if !stderr.trim().is_empty() {
          write!(f, "\n{}", stderr.trim_end())?;
        }
        Ok(())
      }
      ToolError::ExternalBuildFailed { task, command, status } => write!(
        f,
        "External {} task failed: `{}` ({})",
        task,
        command,
        describe_status(status)
      ),
      ToolError::DirectoryExists { url } => write!(f, "Remote directory already exists: {}", url),
    }
  }
}

/// Result type alias for stagehand
pub type StageResult<T> = Result<T, StageError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> StageResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<StageError>,
{
  fn with_context<F>(self, f: F) -> StageResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &StageError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

impl From<anyhow::Error> for StageError {
  fn from(err: anyhow::Error) -> Self {
    StageError::message(err.to_string())
  }
}
