pub mod system_git;

pub use system_git::SystemGit;

/// One `git status --porcelain` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
  /// Two-letter status code (e.g. " M", "??")
  pub code: String,
  pub path: String,
}

impl StatusEntry {
  /// Parse a porcelain v1 line (`XY path`)
  pub fn parse(line: &str) -> Option<Self> {
    if line.len() < 4 {
      return None;
    }
    let (code, rest) = line.split_at(2);
    Some(Self {
      code: code.to_string(),
      path: rest.trim_start().to_string(),
    })
  }
}

impl std::fmt::Display for StatusEntry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.code, self.path)
  }
}
