//! Tests for rebuilding releases from merged release pull requests.

use super::common::*;
use std::sync::Arc;

const PACKAGE_JSON: &str = r#"{"name": "@acme/web", "version": "1.0.0"}"#;

fn node_strategy() -> Strategy {
    create_strategy(
        Arc::new(create_mock_files(&[(
            "packages/web/package.json",
            PACKAGE_JSON,
        )])),
        "packages/web",
        config_for(ReleaseType::Node),
    )
}

#[tokio::test]
async fn release_round_trips_pull_request() {
    let strategy = node_strategy();
    let pr = strategy
        .build_release_pull_request(
            vec![create_test_commit("feat", "offline mode")],
            Some(&create_test_release("1.0.0", Some("web"))),
            false,
            &labels(),
        )
        .await
        .unwrap()
        .unwrap();

    let release = strategy
        .build_release(&merged(&pr))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(release.name, "web: v1.1.0");
    assert_eq!(release.tag.to_string(), "web-v1.1.0");
    assert_eq!(release.tag.version, Version::new(1, 1, 0));
    assert_eq!(release.notes, pr.body.releases[0].notes.trim());
    assert_eq!(release.sha, "merge-sha");
    assert_eq!(release.path, "packages/web");
    assert!(!release.prerelease);
}

#[tokio::test]
async fn release_without_component() {
    let strategy = create_strategy(
        Arc::new(create_mock_files(&[])),
        ".",
        PackageConfig::default(),
    );
    let pr = strategy
        .build_release_pull_request(
            vec![create_test_commit("fix", "a")],
            Some(&create_test_release("2.0.0", None)),
            false,
            &labels(),
        )
        .await
        .unwrap()
        .unwrap();

    let release = strategy
        .build_release(&merged(&pr))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(release.name, "v2.0.1");
    assert_eq!(release.tag.to_string(), "v2.0.1");
}

#[tokio::test]
async fn grouped_body_selects_own_entry() {
    let strategy = node_strategy();
    let merged = MergedPullRequest {
        title: "chore(main): release".into(),
        body: "header\n---\n\n\n\
            <details><summary>api: 3.0.0</summary>\n\n## 3.0.0\n\n* api notes\n</details>\n\n\
            <details><summary>@acme/web: 1.4.0</summary>\n\n## 1.4.0\n\n* web notes\n</details>\
            \n\n---\nfooter"
            .into(),
        head_branch_name: "releasaurus--branches--main".into(),
        sha: "abc".into(),
        labels: vec![],
    };

    let release = strategy.build_release(&merged).await.unwrap().unwrap();

    assert_eq!(release.tag.version, Version::new(1, 4, 0));
    assert_eq!(release.notes, "## 1.4.0\n\n* web notes");
}

#[tokio::test]
async fn grouped_body_entries_without_component_are_unclaimed() {
    let strategy = node_strategy();
    let merged = MergedPullRequest {
        title: "chore(main): release".into(),
        body: "header\n---\n\n\n\
            <details><summary>2.0.1</summary>\n\n## 2.0.1\n\n* b notes\n</details>\n\n\
            <details><summary>api: 3.0.0</summary>\n\n## 3.0.0\n\n* api notes\n</details>\
            \n\n---\nfooter"
            .into(),
        head_branch_name: "releasaurus--branches--main".into(),
        sha: "abc".into(),
        labels: vec![],
    };

    assert!(strategy.build_release(&merged).await.unwrap().is_none());

    let root = create_strategy(
        Arc::new(create_mock_files(&[])),
        ".",
        PackageConfig::default(),
    );
    assert!(root.build_release(&merged).await.unwrap().is_none());
}

#[tokio::test]
async fn grouped_body_versions_win_over_root_title() {
    let strategy = node_strategy();
    let merged = MergedPullRequest {
        title: "chore(main): release api 3.0.0".into(),
        body: "header\n---\n\n\n\
            <details><summary>api: 3.0.0</summary>\n\n## 3.0.0\n\n* api notes\n</details>\n\n\
            <details><summary>web: 1.4.0</summary>\n\n## 1.4.0\n\n* web notes\n</details>\
            \n\n---\nfooter"
            .into(),
        head_branch_name: "releasaurus--branches--main".into(),
        sha: "abc".into(),
        labels: vec![],
    };

    let release = strategy.build_release(&merged).await.unwrap().unwrap();

    assert_eq!(release.tag.to_string(), "web-v1.4.0");
    assert_eq!(release.notes, "## 1.4.0\n\n* web notes");
}

#[tokio::test]
async fn other_components_are_ignored() {
    let strategy = node_strategy();
    let merged = MergedPullRequest {
        title: "chore(main): release api 3.0.0".into(),
        body: "header\n---\n\n\n## 3.0.0\n\n* api notes\n\n---\nfooter".into(),
        head_branch_name: "releasaurus--branches--main--components--api".into(),
        sha: "abc".into(),
        labels: vec![],
    };

    assert!(strategy.build_release(&merged).await.unwrap().is_none());
}

#[tokio::test]
async fn non_release_branches_are_ignored() {
    let strategy = node_strategy();
    let merged = MergedPullRequest {
        title: "chore(main): release web 1.1.0".into(),
        body: "header\n---\n\n\n## 1.1.0\n\n* notes\n\n---\nfooter".into(),
        head_branch_name: "feature/web".into(),
        sha: "abc".into(),
        labels: vec![],
    };

    assert!(strategy.build_release(&merged).await.unwrap().is_none());

    let merged = MergedPullRequest {
        head_branch_name: "releasaurus--branches--main--components--web".into(),
        sha: String::new(),
        ..merged
    };
    assert!(strategy.build_release(&merged).await.unwrap().is_none());
}

#[tokio::test]
async fn snapshot_bumps_are_not_released() {
    let (_dir, repo) = create_test_repository(&[(
        "pom.xml",
        "<project><version>1.2.3</version></project>",
    )]);
    let config = PackageConfigBuilder::default()
        .release_type(ReleaseType::Maven)
        .component(Some("core".to_string()))
        .build()
        .unwrap();
    let strategy = create_strategy(repo, ".", config);

    let pr = strategy
        .build_release_pull_request(
            vec![create_test_commit("fix", "a")],
            Some(&create_test_release("1.2.3", Some("core"))),
            false,
            &labels(),
        )
        .await
        .unwrap()
        .unwrap();
    assert!(pr.version.as_ref().unwrap().is_snapshot());

    assert!(strategy.build_release(&merged(&pr)).await.unwrap().is_none());
}
