//! Already-parsed conventional commits consumed by versioning strategies.
use serde::{Deserialize, Serialize};

/// Title of the commit note that forces an explicit release version.
pub const RELEASE_AS_NOTE: &str = "RELEASE AS";

/// Footer note extracted from a conventional commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitNote {
    pub title: String,
    pub text: String,
}

/// A commit whose conventional-commit grammar has already been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConventionalCommit {
    pub sha: String,
    pub message: String,
    #[serde(rename = "type")]
    pub commit_type: String,
    pub scope: Option<String>,
    pub breaking: bool,
    pub notes: Vec<CommitNote>,
    pub bare_message: String,
    pub references: Vec<String>,
    pub files: Vec<String>,
    /// Title of the pull request the commit was merged through, if known.
    pub pull_request_title: Option<String>,
}

impl ConventionalCommit {
    /// The synthetic no-op fix used by the Java decorators. It always yields
    /// exactly a patch level bump from commit driven strategies.
    pub fn fake_fix() -> Self {
        Self {
            sha: "abc123".into(),
            message: "fix: fake fix".into(),
            commit_type: "fix".into(),
            bare_message: "fake fix".into(),
            ..Default::default()
        }
    }

    /// Returns the `RELEASE AS` literal carried by this commit, if any.
    pub fn release_as(&self) -> Option<&str> {
        self.notes
            .iter()
            .find(|note| note.title == RELEASE_AS_NOTE)
            .map(|note| note.text.trim())
    }

    pub fn is_feature(&self) -> bool {
        self.commit_type == "feat" || self.commit_type == "feature"
    }
}

/// Returns the first `RELEASE AS` literal found, in input order.
pub fn find_release_as(commits: &[ConventionalCommit]) -> Option<&str> {
    commits.iter().find_map(|commit| commit.release_as())
}
