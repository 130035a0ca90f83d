//! Precondition checks run by `prepare` before any destructive step
//!
//! All checks implement the `Check` trait and are registered, in gate order,
//! by `create_precondition_runner()`.
//!
//! # Built-in Checks
//!
//! - **working-tree**: `git status --porcelain` reports nothing
//! - **changelog-header**: changelog opens with `<version> (<stage date>)`
//! - **external**: project-defined commands (license audit, addon checks)
//! - **tooling**: required tools (default `prince`) answer `--version`
//! - **platform**: host runtime is not a forbidden variant and meets the minimum version

mod changelog_header;
mod external;
mod platform;
mod runner;
mod tooling;
mod trait_def;
mod working_tree;

// Re-export public API
pub use runner::create_precondition_runner;
pub use trait_def::Severity;
