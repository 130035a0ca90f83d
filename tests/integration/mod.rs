//! Integration tests driving the stagehand binary against temporary workspaces
//!
//! Every external collaborator (gpg, svn, build, site, prince) is a shell
//! script stub, so these tests run on Unix only.

#![cfg(unix)]

mod helpers;
mod test_check;
mod test_init;
mod test_prepare;
mod test_stage;
