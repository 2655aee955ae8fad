use async_trait::async_trait;
use log::*;
use std::collections::HashSet;

use crate::{
    config::{PackageConfig, ReleaseType},
    path_helpers::{ROOT_PROJECT_PATH, is_root},
    plugin::{Plugin, PluginContext},
    pull_request::{
        BranchName, CandidateReleasePullRequest, PullRequestBody,
        PullRequestTitle, ReleasePullRequest,
    },
    result::Result,
    updater::merge_updates,
};

/// Combines all candidates into a single release pull request.
pub struct MergePlugin {
    ctx: PluginContext,
    pull_request_title_pattern: Option<String>,
}

impl MergePlugin {
    pub fn new(
        ctx: PluginContext,
        pull_request_title_pattern: Option<String>,
    ) -> Self {
        Self {
            ctx,
            pull_request_title_pattern,
        }
    }
}

#[async_trait]
impl Plugin for MergePlugin {
    fn name(&self) -> &'static str {
        "merge"
    }

    async fn run(
        &self,
        candidates: Vec<CandidateReleasePullRequest>,
    ) -> Result<Vec<CandidateReleasePullRequest>> {
        if candidates.len() < 2 {
            return Ok(candidates);
        }
        info!("merging {} pull requests", candidates.len());

        Ok(vec![merge_candidates(
            candidates,
            &self.ctx.target_branch,
            self.pull_request_title_pattern.as_deref(),
        )])
    }
}

/// Folds candidates into one pull request rooted at the repository root.
///
/// The title carries the root package's component and version, if a root
/// package is among the candidates. Releases keep their order in a body
/// rendered per component, updates to the same file are chained and labels
/// are unioned. The result is a draft only when every candidate is.
pub(crate) fn merge_candidates(
    candidates: Vec<CandidateReleasePullRequest>,
    target_branch: &str,
    pattern: Option<&str>,
) -> CandidateReleasePullRequest {
    let root = candidates.iter().find(|c| is_root(&c.path));
    let root_component = root.and_then(|c| c.pull_request.title.component.clone());
    let root_version = root.and_then(|c| c.pull_request.title.version.clone());
    let root_config = root.map(|c| c.config.clone());

    let release_types: HashSet<ReleaseType> = candidates
        .iter()
        .map(|c| c.config.release_type)
        .collect();
    let release_type = match release_types.len() {
        1 => candidates[0].config.release_type,
        _ => ReleaseType::Generic,
    };

    let draft = candidates.iter().all(|c| c.pull_request.draft);

    let mut releases = vec![];
    let mut labels: Vec<String> = vec![];
    let mut updates = vec![];

    for candidate in candidates {
        let pull_request = candidate.pull_request;
        releases.extend(pull_request.body.releases);
        for label in pull_request.labels {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        updates.extend(pull_request.updates);
    }

    let title = PullRequestTitle::new(
        root_component,
        Some(target_branch.to_string()),
        root_version.clone(),
        pattern,
    );

    CandidateReleasePullRequest {
        path: ROOT_PROJECT_PATH.to_string(),
        pull_request: ReleasePullRequest {
            title,
            body: PullRequestBody::new(releases, true),
            updates: merge_updates(updates),
            labels,
            head_ref_name: BranchName::new(target_branch, None).to_string(),
            version: root_version,
            draft,
            group: None,
        },
        config: PackageConfig {
            release_type,
            ..root_config.unwrap_or_default()
        },
    }
}
