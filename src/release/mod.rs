//! Release data: the version being staged and the changelog that describes it
//!
//! - **version**: [`ReleaseVersion`] parsing, base-version derivation, and
//!   synchronization of the embedded `VERSION = "..."` assignment
//! - **changelog**: splitting the changelog into [`ChangelogEntry`] sections

pub mod changelog;
pub mod version;

pub use changelog::ChangelogEntry;
pub use version::ReleaseVersion;
