//! Tests for extra file resolution and their updaters.

use super::common::*;
use crate::{
    config::{ExtraFileSpec, ExtraFileType, extra_file::ExtraFileBuilder},
    error::PlannerError,
    updater::{
        CompositeUpdater, generic::Generic, generic_json::GenericJson,
        generic_toml::GenericToml, java_update::JavaUpdate, pom_xml::PomXml,
    },
};

fn typed(file_type: ExtraFileType, path: &str, glob: bool) -> ExtraFileSpec {
    ExtraFileSpec::Typed(
        ExtraFileBuilder::default()
            .file_type(file_type)
            .path(path)
            .jsonpath(Some("$.version".to_string()))
            .glob(glob)
            .build()
            .unwrap(),
    )
}

#[tokio::test]
async fn resolves_paths_and_globs() {
    let (_dir, repo) = create_test_repository(&[
        ("manifest.json", r#"{"version": "1.0.0"}"#),
        ("app/src/version.rs", "// x-release-please-version"),
        ("app/plugins/a/plugin.toml", "version = \"1.0.0\""),
        ("app/plugins/b/plugin.toml", "version = \"1.0.0\""),
        ("other/plugins/c/plugin.toml", "version = \"1.0.0\""),
    ]);
    let config = PackageConfigBuilder::default()
        .extra_files(vec![
            ExtraFileSpec::Path("src/version.rs".into()),
            typed(ExtraFileType::Json, "/manifest.json", false),
            typed(ExtraFileType::Toml, "plugins/*/plugin.toml", true),
        ])
        .build()
        .unwrap();
    let strategy = create_strategy(repo, "app", config);

    let pr = strategy
        .build_release_pull_request(
            vec![create_test_commit("fix", "a")],
            Some(&create_test_release("1.0.0", None)),
            false,
            &labels(),
        )
        .await
        .unwrap()
        .unwrap();

    let find = |path: &str| pr.updates.iter().find(|u| u.path == path).unwrap();

    assert!(find("app/src/version.rs").updater_as::<Generic>().is_some());
    assert!(find("manifest.json").updater_as::<GenericJson>().is_some());
    assert!(
        find("app/plugins/a/plugin.toml")
            .updater_as::<GenericToml>()
            .is_some()
    );
    assert!(
        find("app/plugins/b/plugin.toml")
            .updater_as::<GenericToml>()
            .is_some()
    );
    assert!(
        !pr.updates
            .iter()
            .any(|u| u.path.starts_with("other/"))
    );
}

#[tokio::test]
async fn anchored_glob_searches_from_root() {
    let (_dir, repo) = create_test_repository(&[
        ("shared/a.toml", "version = \"1.0.0\""),
        ("app/shared/b.toml", "version = \"1.0.0\""),
    ]);
    let config = PackageConfigBuilder::default()
        .extra_files(vec![typed(ExtraFileType::Toml, "/shared/*.toml", true)])
        .build()
        .unwrap();
    let strategy = create_strategy(repo, "app", config);

    let pr = strategy
        .build_release_pull_request(
            vec![create_test_commit("fix", "a")],
            Some(&create_test_release("1.0.0", None)),
            false,
            &labels(),
        )
        .await
        .unwrap()
        .unwrap();

    assert!(pr.updates.iter().any(|u| u.path == "shared/a.toml"));
    assert!(!pr.updates.iter().any(|u| u.path == "app/shared/b.toml"));
}

#[tokio::test]
async fn traversal_in_extra_file_is_rejected() {
    let config = PackageConfigBuilder::default()
        .extra_files(vec![ExtraFileSpec::Path("../../etc/passwd".into())])
        .build()
        .unwrap();
    let strategy = create_strategy(
        std::sync::Arc::new(create_mock_files(&[])),
        "app",
        config,
    );

    let result = strategy
        .build_release_pull_request(
            vec![create_test_commit("fix", "a")],
            Some(&create_test_release("1.0.0", None)),
            false,
            &labels(),
        )
        .await;

    assert!(matches!(result, Err(PlannerError::PathTraversal(_))));
}

#[tokio::test]
async fn java_extra_files_chain_updaters() {
    let (_dir, repo) = create_test_repository(&[
        ("pom.xml", "<project><version>1.0.0</version></project>"),
        ("README.md", "<!-- {x-version-update:core:released} -->"),
    ]);
    let config = PackageConfigBuilder::default()
        .release_type(ReleaseType::Maven)
        .component(Some("core".to_string()))
        .extra_files(vec![ExtraFileSpec::Path("README.md".into())])
        .skip_snapshot(true)
        .build()
        .unwrap();
    let strategy = create_strategy(repo, ".", config);

    let pr = strategy
        .build_release_pull_request(
            vec![create_test_commit("fix", "a")],
            Some(&create_test_release("1.0.0", Some("core"))),
            false,
            &labels(),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(pr.version, Some(Version::new(1, 0, 1)));

    let pom = pr.updates.iter().find(|u| u.path == "pom.xml").unwrap();
    let chain = pom.updater_as::<CompositeUpdater>().unwrap();
    assert_eq!(chain.updaters().len(), 3);
    assert!((*chain.updaters()[0]).as_any().downcast_ref::<PomXml>().is_some());

    let readme = pr.updates.iter().find(|u| u.path == "README.md").unwrap();
    let chain = readme.updater_as::<CompositeUpdater>().unwrap();
    assert!((*chain.updaters()[0]).as_any().downcast_ref::<JavaUpdate>().is_some());
    assert_eq!(chain.updaters().len(), 3);
}
