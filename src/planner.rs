//! Drives planning over every configured package: one strategy per package
//! path, then the configured plugins over the resulting candidates.
use derive_builder::Builder;
use log::*;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    commit::ConventionalCommit,
    config::PlannerConfig,
    error::PlannerError,
    plugin::{Plugin, PluginContext, plugin_for},
    pull_request::{CandidateReleasePullRequest, MergedPullRequest},
    release::{CandidateRelease, Release},
    repository::RepositoryFiles,
    result::Result,
    strategy::Strategy,
    versioning::VersioningRegistry,
};

/// Commits since the latest release of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageHistory {
    pub commits: Vec<ConventionalCommit>,
    pub latest_release: Option<Release>,
}

/// Histories keyed by package path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanInput {
    pub packages: BTreeMap<String, PackageHistory>,
}

#[derive(Builder)]
#[builder(build_fn(private, name = "_build"))]
pub struct PlannerParams {
    pub config: PlannerConfig,
    pub repository: Arc<dyn RepositoryFiles>,
}

impl PlannerParamsBuilder {
    pub fn build(&self) -> Result<Planner> {
        self.build_with_registry(&VersioningRegistry::default())
    }

    pub fn build_with_registry(
        &self,
        registry: &VersioningRegistry,
    ) -> Result<Planner> {
        let params = self._build().map_err(|e| {
            PlannerError::configuration(format!(
                "Failed to build planner: {}",
                e
            ))
        })?;
        Planner::new(params, registry)
    }
}

pub struct Planner {
    config: PlannerConfig,
    repository: Arc<dyn RepositoryFiles>,
    strategies: Vec<Strategy>,
}

impl Planner {
    pub fn builder() -> PlannerParamsBuilder {
        PlannerParamsBuilder::default()
    }

    pub fn new(
        params: PlannerParams,
        registry: &VersioningRegistry,
    ) -> Result<Self> {
        let config = params.config;

        let strategies = config
            .packages
            .iter()
            .map(|(path, package)| {
                Strategy::builder()
                    .repository(Arc::clone(&params.repository))
                    .path(path.as_str())
                    .config(package.clone())
                    .target_branch(config.target_branch.as_str())
                    .repository_url(config.repository_url.clone())
                    .snapshot_labels(config.snapshot_labels.clone())
                    .build_with_registry(registry)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            repository: params.repository,
            strategies,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    fn plugin_context(&self) -> PluginContext {
        PluginContext {
            repository: Arc::clone(&self.repository),
            target_branch: self.config.target_branch.clone(),
            packages: self.config.packages.clone(),
            labels: self.config.labels.clone(),
        }
    }

    /// Builds the candidate release pull request of every package and runs
    /// the plugins over them. A package that fails is logged and produces
    /// no candidate.
    pub async fn build_candidates(
        &self,
        input: &PlanInput,
    ) -> Result<Vec<CandidateReleasePullRequest>> {
        let mut candidates = vec![];

        for strategy in &self.strategies {
            let path = strategy.path();
            let history = input.packages.get(path).cloned().unwrap_or_default();
            info!(
                "{path}: planning from {} commits",
                history.commits.len()
            );

            let result = strategy
                .build_release_pull_request(
                    history.commits,
                    history.latest_release.as_ref(),
                    strategy.config().draft,
                    &self.config.labels,
                )
                .await;

            match result {
                Ok(Some(pull_request)) => {
                    candidates.push(CandidateReleasePullRequest {
                        path: path.to_string(),
                        pull_request,
                        config: strategy.config().clone(),
                    });
                }
                Ok(None) => info!("{path}: nothing to release"),
                Err(err) => {
                    error!("{path}: failed to build release pull request: {err}")
                }
            }
        }

        let plugins: Vec<Box<dyn Plugin>> = self
            .config
            .plugins
            .iter()
            .map(|config| plugin_for(config, self.plugin_context()))
            .collect();

        run_plugins(&plugins, candidates).await
    }

    /// Releases of every package published by a merged release pull
    /// request.
    pub async fn build_releases(
        &self,
        merged: &MergedPullRequest,
    ) -> Result<Vec<CandidateRelease>> {
        let mut releases = vec![];

        for strategy in &self.strategies {
            match strategy.build_release(merged).await {
                Ok(Some(release)) => releases.push(release),
                Ok(None) => {}
                Err(err) => error!(
                    "{}: failed to build release: {err}",
                    strategy.path()
                ),
            }
        }

        Ok(releases)
    }
}

/// Runs `plugins` in order, each over the output of the previous one.
async fn run_plugins(
    plugins: &[Box<dyn Plugin>],
    mut candidates: Vec<CandidateReleasePullRequest>,
) -> Result<Vec<CandidateReleasePullRequest>> {
    for plugin in plugins {
        info!(
            "running plugin {} over {} candidates",
            plugin.name(),
            candidates.len()
        );
        candidates = plugin.run(candidates).await?;
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{NodeWorkspaceConfig, PackageConfig, PluginConfig, ReleaseType},
        plugin::MockPlugin,
        test_helpers::{create_mock_files, create_test_commit, create_test_release},
    };
    use mockall::Sequence;
    use std::collections::BTreeMap;

    const CORE: &str = r#"{"name": "@acme/core", "version": "1.0.0"}"#;
    const WEB: &str = r#"{"name": "@acme/web", "version": "2.0.0", "dependencies": {"@acme/core": "^1.0.0"}}"#;

    fn package(release_type: ReleaseType) -> PackageConfig {
        PackageConfig {
            release_type,
            ..Default::default()
        }
    }

    fn planner(
        files: &[(&str, &str)],
        packages: &[(&str, PackageConfig)],
        plugins: Vec<PluginConfig>,
    ) -> Planner {
        let config = PlannerConfig {
            packages: packages
                .iter()
                .map(|(path, config)| (path.to_string(), config.clone()))
                .collect::<BTreeMap<_, _>>(),
            plugins,
            ..Default::default()
        };

        Planner::builder()
            .config(config)
            .repository(Arc::new(create_mock_files(files)) as Arc<dyn RepositoryFiles>)
            .build()
            .unwrap()
    }

    fn history(commits: &[(&str, &str)], latest: Option<&str>) -> PackageHistory {
        PackageHistory {
            commits: commits
                .iter()
                .map(|(kind, message)| create_test_commit(kind, message))
                .collect(),
            latest_release: latest.map(|version| create_test_release(version, None)),
        }
    }

    fn input(histories: Vec<(&str, PackageHistory)>) -> PlanInput {
        PlanInput {
            packages: histories
                .into_iter()
                .map(|(path, history)| (path.to_string(), history))
                .collect(),
        }
    }

    #[test_log::test(tokio::test)]
    async fn failing_package_produces_no_candidate() {
        let planner = planner(
            &[],
            &[
                ("tools", package(ReleaseType::Generic)),
                ("web", package(ReleaseType::Node)),
            ],
            vec![],
        );
        let input = input(vec![
            ("tools", history(&[("fix", "crash")], Some("0.4.0"))),
            ("web", history(&[("feat", "dark mode")], Some("1.0.0"))),
        ]);

        let candidates = planner.build_candidates(&input).await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].path, "tools");
        assert_eq!(
            candidates[0].pull_request.version,
            Some(crate::version::Version::new(0, 4, 1))
        );
    }

    #[tokio::test]
    async fn packages_without_history_are_skipped() {
        let planner = planner(&[], &[("tools", package(ReleaseType::Generic))], vec![]);

        let candidates = planner.build_candidates(&PlanInput::default()).await.unwrap();
        assert!(candidates.is_empty());
    }

    fn node_workspace_planner(plugin: NodeWorkspaceConfig) -> Planner {
        planner(
            &[
                ("packages/core/package.json", CORE),
                ("packages/web/package.json", WEB),
            ],
            &[
                ("packages/core", package(ReleaseType::Node)),
                ("packages/web", package(ReleaseType::Node)),
            ],
            vec![PluginConfig::NodeWorkspace(plugin)],
        )
    }

    fn core_feature() -> PlanInput {
        input(vec![(
            "packages/core",
            history(&[("feat", "streaming")], Some("1.0.0")),
        )])
    }

    #[tokio::test]
    async fn runs_plugins_over_candidates() {
        let planner = node_workspace_planner(NodeWorkspaceConfig {
            merge: false,
            manifest_path: None,
        });

        let candidates = planner.build_candidates(&core_feature()).await.unwrap();

        let paths: Vec<&str> = candidates.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["packages/core", "packages/web"]);
        assert_eq!(
            candidates[1].pull_request.version.as_ref().map(|v| v.to_string()),
            Some("2.0.1".to_string())
        );

        let web = &candidates[1].pull_request;
        let merged = MergedPullRequest {
            title: web.title.to_string(),
            body: web.body.to_string(),
            head_branch_name: web.head_ref_name.clone(),
            sha: "abc123".into(),
            labels: vec![],
        };
        let releases = planner.build_releases(&merged).await.unwrap();

        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].path, "packages/web");
        assert_eq!(releases[0].tag.to_string(), "web-v2.0.1");
    }

    #[tokio::test]
    async fn default_workspace_merges_into_one_release_pull_request() {
        let planner = node_workspace_planner(NodeWorkspaceConfig::default());

        let candidates = planner.build_candidates(&core_feature()).await.unwrap();

        assert_eq!(candidates.len(), 1);
        let pull_request = &candidates[0].pull_request;
        assert_eq!(candidates[0].path, ".");
        assert_eq!(pull_request.body.releases.len(), 2);

        let merged = MergedPullRequest {
            title: pull_request.title.to_string(),
            body: pull_request.body.to_string(),
            head_branch_name: pull_request.head_ref_name.clone(),
            sha: "abc123".into(),
            labels: vec![],
        };
        let releases = planner.build_releases(&merged).await.unwrap();

        let tags: Vec<String> =
            releases.iter().map(|r| r.tag.to_string()).collect();
        assert_eq!(tags, vec!["core-v1.1.0", "web-v2.0.1"]);
        assert!(releases[1].notes.contains("@acme/core bumped from ^1.0.0 to ^1.1.0"));
    }

    #[tokio::test]
    async fn builds_releases_for_matching_package() {
        let planner = planner(
            &[],
            &[
                (
                    "api",
                    PackageConfig {
                        component: Some("api".into()),
                        ..Default::default()
                    },
                ),
                (
                    "cli",
                    PackageConfig {
                        component: Some("cli".into()),
                        ..Default::default()
                    },
                ),
            ],
            vec![],
        );
        let input = input(vec![("api", history(&[("feat", "search")], None))]);
        let candidates = planner.build_candidates(&input).await.unwrap();
        let pull_request = &candidates[0].pull_request;

        let merged = MergedPullRequest {
            title: pull_request.title.to_string(),
            body: pull_request.body.to_string(),
            head_branch_name: pull_request.head_ref_name.clone(),
            sha: "abc123".into(),
            labels: vec![],
        };
        let releases = planner.build_releases(&merged).await.unwrap();

        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].path, "api");
        assert_eq!(releases[0].tag.to_string(), "api-v1.0.0");
        assert_eq!(releases[0].sha, "abc123");
    }

    #[tokio::test]
    async fn plugins_run_in_order_and_errors_propagate() {
        let mut seq = Sequence::new();

        let mut first = MockPlugin::new();
        first.expect_name().return_const("first");
        first
            .expect_run()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec![]));

        let mut second = MockPlugin::new();
        second.expect_name().return_const("second");
        second
            .expect_run()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|candidates| {
                assert!(candidates.is_empty());
                Err(PlannerError::DependencyCycle("a -> b -> a".into()))
            });

        let plugins: Vec<Box<dyn Plugin>> = vec![Box::new(first), Box::new(second)];
        let result = run_plugins(&plugins, vec![]).await;

        assert!(matches!(result, Err(PlannerError::DependencyCycle(_))));
    }

    #[test]
    fn unknown_versioning_key_fails_to_build() {
        let config = PlannerConfig {
            packages: BTreeMap::from([(
                "tools".to_string(),
                PackageConfig {
                    versioning: "calendar".into(),
                    ..Default::default()
                },
            )]),
            ..Default::default()
        };

        let result = Planner::builder()
            .config(config)
            .repository(Arc::new(create_mock_files(&[])) as Arc<dyn RepositoryFiles>)
            .build();

        assert!(matches!(result, Err(PlannerError::Configuration(_))));
    }

    #[test]
    fn deserializes_plan_input() {
        let json = r#"{
            "packages": {
                "tools": {
                    "commits": [{"sha": "abc", "message": "fix: crash", "type": "fix", "bareMessage": "crash"}],
                    "latestRelease": {
                        "tag": {"component": null, "version": "0.4.0", "separator": "-", "includeV": true},
                        "sha": "def"
                    }
                }
            }
        }"#;

        let input: PlanInput = serde_json::from_str(json).unwrap();
        let tools = &input.packages["tools"];
        assert_eq!(tools.commits[0].commit_type, "fix");
        assert_eq!(
            tools.latest_release.as_ref().unwrap().tag.to_string(),
            "v0.4.0"
        );
    }
}
