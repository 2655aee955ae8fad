//! Common test helper functions shared across test modules.
//!
//! This module provides reusable fixtures: seeded local checkouts, mocked
//! repository access, commits and releases.
use std::{collections::HashMap, fs, path::Path, sync::Arc};
use tempfile::TempDir;

use crate::{
    commit::{CommitNote, ConventionalCommit},
    error::PlannerError,
    release::{DEFAULT_TAG_SEPARATOR, Release, TagName},
    repository::{FileContents, LocalRepository, MockRepositoryFiles},
    version::Version,
};

/// Creates a temporary checkout containing `files` and a
/// [`LocalRepository`] reading from it. Keep the [`TempDir`] alive for the
/// duration of the test.
///
/// # Example
/// ```ignore
/// let (_dir, repo) = create_test_repository(&[("pom.xml", POM)]);
/// ```
pub fn create_test_repository(
    files: &[(&str, &str)],
) -> (TempDir, Arc<LocalRepository>) {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), files);
    let repository = Arc::new(LocalRepository::new(dir.path()));
    (dir, repository)
}

pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
}

/// Mock serving `files` by exact path. Anything else is reported as not
/// found, and searches return nothing.
pub fn create_mock_files(files: &[(&str, &str)]) -> MockRepositoryFiles {
    let files: HashMap<String, String> = files
        .iter()
        .map(|(path, content)| (path.to_string(), content.to_string()))
        .collect();

    let mut mock = MockRepositoryFiles::new();
    mock.expect_get_file_contents_on_branch()
        .returning(move |path, _| {
            files
                .get(&path)
                .map(FileContents::new)
                .ok_or(PlannerError::FileNotFound(path))
        });
    mock.expect_find_files_by_filename_and_ref()
        .returning(|_, _, _| Ok(vec![]));
    mock.expect_find_files_by_glob_and_ref()
        .returning(|_, _, _| Ok(vec![]));
    mock
}

pub fn create_test_commit(commit_type: &str, message: &str) -> ConventionalCommit {
    ConventionalCommit {
        sha: format!("{commit_type}0123456789"),
        message: format!("{commit_type}: {message}"),
        commit_type: commit_type.to_string(),
        bare_message: message.to_string(),
        ..Default::default()
    }
}

pub fn create_breaking_commit(message: &str) -> ConventionalCommit {
    ConventionalCommit {
        breaking: true,
        notes: vec![CommitNote {
            title: "BREAKING CHANGE".into(),
            text: message.into(),
        }],
        ..create_test_commit("feat", message)
    }
}

pub fn create_release_as_commit(version: &str) -> ConventionalCommit {
    ConventionalCommit {
        notes: vec![CommitNote {
            title: crate::commit::RELEASE_AS_NOTE.into(),
            text: version.into(),
        }],
        ..create_test_commit("chore", "release")
    }
}

/// Creates the latest release of a package, tagged `[component-]v<version>`.
pub fn create_test_release(version: &str, component: Option<&str>) -> Release {
    Release {
        tag: TagName::new(
            Version::parse(version).unwrap(),
            component.map(String::from),
            DEFAULT_TAG_SEPARATOR,
            true,
        ),
        sha: "release-sha".into(),
        notes: None,
    }
}
