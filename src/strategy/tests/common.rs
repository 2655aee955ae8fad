use std::sync::Arc;

pub use crate::{
    config::{PackageConfig, PackageConfigBuilder, ReleaseType},
    pull_request::{MergedPullRequest, ReleasePullRequest},
    repository::RepositoryFiles,
    strategy::Strategy,
    test_helpers::*,
    version::Version,
};

pub fn labels() -> Vec<String> {
    vec!["releasaurus:pending".to_string()]
}

pub fn create_strategy(
    repository: Arc<dyn RepositoryFiles>,
    path: &str,
    config: PackageConfig,
) -> Strategy {
    Strategy::builder()
        .repository(repository)
        .path(path)
        .config(config)
        .build()
        .unwrap()
}

pub fn config_for(release_type: ReleaseType) -> PackageConfig {
    PackageConfigBuilder::default()
        .release_type(release_type)
        .build()
        .unwrap()
}

/// The merged form of a release pull request, as a forge would report it.
pub fn merged(pull_request: &ReleasePullRequest) -> MergedPullRequest {
    MergedPullRequest {
        title: pull_request.title.to_string(),
        body: pull_request.body.to_string(),
        head_branch_name: pull_request.head_ref_name.clone(),
        sha: "merge-sha".into(),
        labels: pull_request.labels.clone(),
    }
}
