//! Version resolution and release pull request planning.
//!
//! A [`Planner`] turns per-package conventional commits into candidate
//! release pull requests (version bumps, changelog entries and file
//! updates), propagates releases across Maven and npm workspaces through
//! plugins, and parses merged release pull requests back into releases.
pub mod changelog_notes;
pub mod commit;
pub mod config;
pub mod error;
pub mod path_helpers;
pub mod planner;
pub mod plugin;
pub mod pull_request;
pub mod release;
pub mod repository;
pub mod result;
pub mod strategy;
pub mod updater;
pub mod version;
pub mod versioning;

pub use error::PlannerError;
pub use planner::{PackageHistory, PlanInput, Planner, PlannerParams};
pub use result::Result;
pub use strategy::Strategy;
pub use version::Version;

#[cfg(test)]
pub mod test_helpers;
