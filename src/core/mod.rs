//! Core building blocks shared by every stagehand command
//!
//! - **config**: stage.toml parsing and per-run settings
//! - **context**: resolved run context passed to commands and the pipeline
//! - **error**: error taxonomy with help messages and exit codes
//! - **process**: external command invocation
//! - **vcs**: git working-tree inspection (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod process;
pub mod vcs;
