//! Command execution for the planner binary.
//!
//! Each command loads the configuration, builds a
//! [`releasaurus_planner::Planner`] over the local checkout and prints its
//! results as JSON:
//!
//! - **plan**: candidate release pull requests for the given histories
//! - **release**: releases published by a merged release pull request

/// Configuration loading and JSON output shared by the commands.
pub mod common;

/// Builds and optionally applies candidate release pull requests.
pub mod plan;

/// Builds the releases of a merged release pull request.
pub mod release;
