use std::{collections::BTreeMap, sync::Arc};

pub use crate::{
    config::{PackageConfig, ReleaseType},
    plugin::{
        MavenWorkspace, MergePlugin, NodeWorkspace, Plugin, PluginContext,
        WorkspaceOptions, WorkspacePlugin,
    },
    pull_request::{
        BranchName, CandidateReleasePullRequest, PullRequestBody,
        PullRequestTitle, ReleaseData, ReleasePullRequest,
    },
    repository::RepositoryFiles,
    test_helpers::*,
    updater::{
        AsAny, CompositeUpdater, Update, Updater, changelog::Changelog,
        package_json::PackageJson, pom_xml::PomXml,
        release_manifest::ReleaseManifest,
    },
    version::{Version, VersionsMap},
};

pub fn labels() -> Vec<String> {
    vec!["releasaurus:pending".to_string()]
}

pub fn config_for(release_type: ReleaseType) -> PackageConfig {
    PackageConfig {
        release_type,
        ..Default::default()
    }
}

pub fn context(
    repository: Arc<dyn RepositoryFiles>,
    packages: &[(&str, ReleaseType)],
) -> PluginContext {
    PluginContext {
        repository,
        target_branch: "main".into(),
        packages: packages
            .iter()
            .map(|(path, release_type)| (path.to_string(), config_for(*release_type)))
            .collect::<BTreeMap<_, _>>(),
        labels: labels(),
    }
}

pub fn notes(version: &str) -> String {
    format!("## {version}\n\n### Bug Fixes\n\n* fix")
}

/// A commit driven candidate as a strategy would produce it.
pub fn candidate(
    path: &str,
    release_type: ReleaseType,
    component: Option<&str>,
    version: &str,
    updates: Vec<Update>,
) -> CandidateReleasePullRequest {
    let version = Version::parse(version).unwrap();
    let component = component.map(String::from);

    CandidateReleasePullRequest {
        path: path.to_string(),
        pull_request: ReleasePullRequest {
            title: PullRequestTitle::new(
                component.clone(),
                Some("main".into()),
                Some(version.clone()),
                None,
            ),
            body: PullRequestBody::new(
                vec![ReleaseData {
                    component: component.clone(),
                    version: Some(version.clone()),
                    notes: notes(&version.to_string()),
                }],
                false,
            ),
            updates,
            labels: labels(),
            head_ref_name: BranchName::new("main", component).to_string(),
            version: Some(version),
            draft: false,
            group: None,
        },
        config: config_for(release_type),
    }
}

pub fn paths(candidate: &CandidateReleasePullRequest) -> Vec<&str> {
    candidate
        .pull_request
        .updates
        .iter()
        .map(|update| update.path.as_str())
        .collect()
}

pub fn update<'a>(
    candidate: &'a CandidateReleasePullRequest,
    path: &str,
) -> &'a Update {
    candidate
        .pull_request
        .updates
        .iter()
        .find(|update| update.path == path)
        .unwrap()
}
