//! CLI commands for stagehand
//!
//! - **prepare**: version sync and fail-fast preconditions
//! - **stage**: prepare, then build, sign, upload, and draft the vote email
//! - **check**: report every precondition (doctor-style)
//! - **clobber**: remove staging output
//! - **init**: write a default stage.toml
//! - **changes**: print a changelog entry as staged
//!
//! All commands except init accept `&StageContext` built once in main.

pub mod changes;
pub mod check;
pub mod clobber;
pub mod init;
pub mod prepare;
pub mod stage;

pub use changes::run_changes;
pub use check::run_check;
pub use clobber::run_clobber;
pub use init::run_init;
pub use prepare::run_prepare;
pub use stage::run_stage;
