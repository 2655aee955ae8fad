//! Plugins that post-process the candidate release pull requests of every
//! package, in configured order.
//!
//! The workspace plugins propagate version bumps through a monorepo's
//! dependency graph: a package depending on a released package is released
//! too, with its manifest pointing at the new version. The merge plugin
//! combines candidates into a single pull request.
use async_trait::async_trait;
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    config::{PackageConfig, PluginConfig},
    pull_request::CandidateReleasePullRequest,
    repository::RepositoryFiles,
    result::Result,
};

mod dependency_notes;
pub mod graph;
mod maven_workspace;
mod merge;
mod node_workspace;
mod workspace;

pub use dependency_notes::{
    WORKSPACE_DEPENDENCIES_NOTE, append_dependencies_section_to_changelog,
};
pub use graph::{DependencyGraph, DependencyNode};
pub use maven_workspace::{MavenArtifact, MavenWorkspace};
pub use merge::MergePlugin;
pub use node_workspace::{NodePackage, NodeWorkspace};
pub use workspace::{WorkspaceAdapter, WorkspaceOptions, WorkspacePlugin};


/// Repository level state shared by plugins.
#[derive(Clone)]
pub struct PluginContext {
    pub repository: Arc<dyn RepositoryFiles>,
    pub target_branch: String,
    /// Package configs keyed by package path.
    pub packages: BTreeMap<String, PackageConfig>,
    /// Labels for pull requests a plugin synthesizes.
    pub labels: Vec<String>,
}

/// Transforms the full list of candidates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    async fn run(
        &self,
        candidates: Vec<CandidateReleasePullRequest>,
    ) -> Result<Vec<CandidateReleasePullRequest>>;
}

/// Instantiates the plugin described by `config`.
pub fn plugin_for(config: &PluginConfig, ctx: PluginContext) -> Box<dyn Plugin> {
    match config {
        PluginConfig::MavenWorkspace(options) => {
            let workspace_options = WorkspaceOptions {
                merge: options.merge,
                manifest_path: options.manifest_path.clone(),
            };
            Box::new(WorkspacePlugin::new(
                MavenWorkspace::new(ctx.clone(), options.consider_all_artifacts),
                ctx,
                workspace_options,
            ))
        }
        PluginConfig::NodeWorkspace(options) => {
            let workspace_options = WorkspaceOptions {
                merge: options.merge,
                manifest_path: options.manifest_path.clone(),
            };
            Box::new(WorkspacePlugin::new(
                NodeWorkspace::new(ctx.clone()),
                ctx,
                workspace_options,
            ))
        }
        PluginConfig::Merge(options) => Box::new(MergePlugin::new(
            ctx,
            options.pull_request_title_pattern.clone(),
        )),
    }
}
