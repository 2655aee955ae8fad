//! Tests for combining candidates into one release pull request.

use super::common::*;
use crate::{pull_request::MergedPullRequest, strategy::Strategy};
use std::sync::Arc;

fn merge_plugin(pattern: Option<&str>) -> MergePlugin {
    let repository: Arc<dyn RepositoryFiles> = Arc::new(create_mock_files(&[]));
    MergePlugin::new(context(repository, &[]), pattern.map(String::from))
}

fn with_label(
    mut candidate: CandidateReleasePullRequest,
    label: &str,
) -> CandidateReleasePullRequest {
    candidate.pull_request.labels.push(label.to_string());
    candidate
}

fn lock_update(version: &str) -> Update {
    Update::new("package-lock.json", PackageJson::new(Version::parse(version).unwrap()))
}

#[tokio::test]
async fn merges_into_root_release() {
    let root = candidate(".", ReleaseType::Node, None, "1.2.0", vec![lock_update("1.2.0")]);
    let web = with_label(
        candidate(
            "packages/web",
            ReleaseType::Node,
            Some("web"),
            "2.0.0",
            vec![
                lock_update("2.0.0"),
                Update::new("packages/web/package.json", PackageJson::new(Version::new(2, 0, 0))),
            ],
        ),
        "frontend",
    );

    let result = merge_plugin(None).run(vec![root, web]).await.unwrap();

    assert_eq!(result.len(), 1);
    let merged = &result[0];
    assert_eq!(merged.path, ".");
    assert_eq!(merged.config.release_type, ReleaseType::Node);
    assert_eq!(merged.pull_request.title.to_string(), "chore(main): release 1.2.0");
    assert_eq!(merged.pull_request.version, Some(Version::new(1, 2, 0)));
    assert_eq!(merged.pull_request.head_ref_name, "releasaurus--branches--main");
    assert_eq!(
        merged.pull_request.labels,
        vec!["releasaurus:pending".to_string(), "frontend".to_string()]
    );
    assert!(!merged.pull_request.draft);

    assert_eq!(paths(merged), vec!["package-lock.json", "packages/web/package.json"]);
    let chain = update(merged, "package-lock.json")
        .updater_as::<CompositeUpdater>()
        .unwrap();
    assert_eq!(chain.updaters().len(), 2);

    let body = merged.pull_request.body.to_string();
    assert!(body.contains("<details><summary>1.2.0</summary>"));
    assert!(body.contains("<details><summary>web: 2.0.0</summary>"));
}

#[tokio::test]
async fn merges_without_root_package() {
    let mut core = candidate("core", ReleaseType::Java, Some("core"), "1.0.1", vec![]);
    let mut web = candidate("web", ReleaseType::Node, Some("web"), "2.0.0", vec![]);
    core.pull_request.draft = true;
    web.pull_request.draft = true;

    let result = merge_plugin(Some("chore: release ${branch}"))
        .run(vec![core, web])
        .await
        .unwrap();

    let merged = &result[0];
    assert_eq!(merged.pull_request.title.to_string(), "chore: release main");
    assert_eq!(merged.pull_request.version, None);
    assert_eq!(merged.config.release_type, ReleaseType::Generic);
    assert!(merged.pull_request.draft);
}

#[tokio::test]
async fn single_candidate_is_untouched() {
    let web = candidate("web", ReleaseType::Node, Some("web"), "2.0.0", vec![]);

    let result = merge_plugin(None).run(vec![web]).await.unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].path, "web");
    assert_eq!(result[0].pull_request.title.to_string(), "chore(main): release web 2.0.0");
}

#[tokio::test]
async fn merged_body_releases_each_component() {
    let core = candidate("core", ReleaseType::Generic, Some("core"), "1.0.1", vec![]);
    let web = candidate("web", ReleaseType::Generic, Some("web"), "2.0.0", vec![]);

    let result = merge_plugin(None).run(vec![core, web]).await.unwrap();
    let pull_request = &result[0].pull_request;
    let merged = MergedPullRequest {
        title: pull_request.title.to_string(),
        body: pull_request.body.to_string(),
        head_branch_name: pull_request.head_ref_name.clone(),
        sha: "merge-sha".into(),
        labels: pull_request.labels.clone(),
    };

    let strategy = Strategy::builder()
        .repository(Arc::new(create_mock_files(&[])) as Arc<dyn RepositoryFiles>)
        .path("web")
        .config(PackageConfig {
            component: Some("web".into()),
            ..Default::default()
        })
        .build()
        .unwrap();

    let release = strategy.build_release(&merged).await.unwrap().unwrap();
    assert_eq!(release.tag.to_string(), "web-v2.0.0");
    assert_eq!(release.path, "web");
    assert_eq!(release.notes, notes("2.0.0"));
}
