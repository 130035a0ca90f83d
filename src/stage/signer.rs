//! Checksums and detached signatures for staged artifacts
//!
//! Every artifact gets three sidecars next to it:
//!
//! | File               | Content                       |
//! |--------------------|-------------------------------|
//! | `<artifact>.md5`   | `<md5 hex> <basename>`        |
//! | `<artifact>.sha1`  | `<sha1 hex> <basename>`       |
//! | `<artifact>.asc`   | armored detached signature    |
//!
//! Digests are computed in-process; signing is delegated to a gpg-compatible
//! program. The artifact itself is never modified.

use crate::core::error::{StageResult, ToolError};
use crate::core::process::ToolCommand;
use crate::utils;
use md5::Md5;
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Supported content digests (both are always produced)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
  Md5,
  Sha1,
}

impl DigestAlgorithm {
  pub const ALL: [DigestAlgorithm; 2] = [DigestAlgorithm::Md5, DigestAlgorithm::Sha1];

  /// Sidecar file extension
  pub fn extension(self) -> &'static str {
    match self {
      DigestAlgorithm::Md5 => "md5",
      DigestAlgorithm::Sha1 => "sha1",
    }
  }

  /// Lowercase hex digest of `bytes`
  pub fn hex_digest(self, bytes: &[u8]) -> String {
    match self {
      DigestAlgorithm::Md5 => format!("{:x}", Md5::digest(bytes)),
      DigestAlgorithm::Sha1 => format!("{:x}", Sha1::digest(bytes)),
    }
  }
}

/// What sort of package an artifact is, judged by file name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
  PackageArchive,
  ZipArchive,
  Gem,
  Other,
}

impl ArtifactKind {
  pub fn from_path(path: &Path) -> Self {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().to_lowercase())
      .unwrap_or_default();

    if name.ends_with(".tgz") || name.ends_with(".tar.gz") {
      ArtifactKind::PackageArchive
    } else if name.ends_with(".zip") {
      ArtifactKind::ZipArchive
    } else if name.ends_with(".gem") {
      ArtifactKind::Gem
    } else {
      ArtifactKind::Other
    }
  }
}

/// A digest written to a sidecar file
#[derive(Debug, Clone, Serialize)]
pub struct Checksum {
  pub algorithm: DigestAlgorithm,
  pub digest: String,
  pub path: PathBuf,
}

/// A staged artifact with its checksum and signature sidecars
#[derive(Debug, Clone, Serialize)]
pub struct SignedArtifact {
  pub path: PathBuf,
  pub kind: ArtifactKind,
  pub checksums: Vec<Checksum>,
  pub signature: PathBuf,
}

impl SignedArtifact {
  /// Base file name
  pub fn name(&self) -> String {
    self
      .path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .unwrap_or_default()
  }

  pub fn checksum(&self, algorithm: DigestAlgorithm) -> Option<&Checksum> {
    self.checksums.iter().find(|c| c.algorithm == algorithm)
  }

  /// MD5 hex digest (always present on signed artifacts)
  pub fn md5(&self) -> &str {
    self
      .checksum(DigestAlgorithm::Md5)
      .map(|c| c.digest.as_str())
      .unwrap_or_default()
  }
}

/// `<artifact>.<ext>` next to the artifact
fn sidecar(artifact: &Path, extension: &str) -> PathBuf {
  let mut name = artifact.as_os_str().to_owned();
  name.push(".");
  name.push(extension);
  PathBuf::from(name)
}

/// Writes checksum sidecars and delegates detached signing
pub struct ChecksumSigner {
  program: String,
  signer: String,
  passphrase: Option<String>,
}

impl ChecksumSigner {
  pub fn new(program: impl Into<String>, signer: impl Into<String>, passphrase: Option<String>) -> Self {
    Self {
      program: program.into(),
      signer: signer.into(),
      passphrase,
    }
  }

  /// Whether signing runs without operator interaction
  pub fn is_batch(&self) -> bool {
    self.passphrase.is_some()
  }

  /// Signing command for one artifact
  ///
  /// `gpg --local-user <id> --armor --output <artifact>.asc --detach-sig <artifact>`,
  /// with batch flags and the passphrase on stdin when one is supplied.
  pub fn signing_command(&self, artifact: &Path) -> ToolCommand {
    let signature = sidecar(artifact, "asc");
    let mut cmd = ToolCommand::new(&self.program);

    if let Some(ref passphrase) = self.passphrase {
      cmd = cmd
        .args(["--batch", "--yes", "--pinentry-mode", "loopback", "--passphrase-fd", "0"])
        .stdin_input(format!("{}\n", passphrase));
    }

    cmd
      .arg("--local-user")
      .arg(&self.signer)
      .arg("--armor")
      .arg("--output")
      .arg(signature.to_string_lossy())
      .arg("--detach-sig")
      .arg(artifact.to_string_lossy())
  }

  /// Write both checksum sidecars for an artifact
  pub fn write_checksums(&self, artifact: &Path) -> StageResult<Vec<Checksum>> {
    let bytes = fs::read(artifact).map_err(|e| utils::with_path(e, artifact))?;
    let basename = utils::file_name(artifact)?;

    DigestAlgorithm::ALL
      .iter()
      .map(|&algorithm| -> StageResult<Checksum> {
        let digest = algorithm.hex_digest(&bytes);
        let path = sidecar(artifact, algorithm.extension());
        utils::write(&path, format!("{} {}\n", digest, basename))?;
        Ok(Checksum { algorithm, digest, path })
      })
      .collect()
  }

  /// Checksum and sign one artifact
  pub fn sign(&self, artifact: &Path) -> StageResult<SignedArtifact> {
    let checksums = self.write_checksums(artifact)?;
    let signature = sidecar(artifact, "asc");
    let command = self.signing_command(artifact);

    if self.is_batch() {
      command.run()?;
    } else {
      let status = command.run_interactive()?;
      if !status.success() {
        return Err(
          ToolError::CommandFailed {
            command: command.display(),
            status: status.code(),
            stderr: String::new(),
          }
          .into(),
        );
      }
    }

    if !signature.exists() {
      return Err(
        ToolError::CommandFailed {
          command: command.display(),
          status: Some(0),
          stderr: format!("no signature written to {}", signature.display()),
        }
        .into(),
      );
    }

    debug!(artifact = %artifact.display(), "signed");
    Ok(SignedArtifact {
      path: artifact.to_path_buf(),
      kind: ArtifactKind::from_path(artifact),
      checksums,
      signature,
    })
  }
}
