//! Release pull request descriptors and the codecs for their title, head
//! branch and body.
use serde::{Deserialize, Serialize};

use crate::{config::PackageConfig, updater::Update, version::Version};

mod body;
mod branch_name;
mod title;

pub use body::{DEFAULT_FOOTER, DEFAULT_HEADER, PullRequestBody, ReleaseData};
pub use branch_name::{BRANCH_PREFIX, BranchName};
pub use title::{DEFAULT_PR_TITLE_PATTERN, PullRequestTitle};

/// Label applied to release pull requests while waiting for merge.
pub const PENDING_LABEL: &str = "releasaurus:pending";
/// Label applied to snapshot bump pull requests.
pub const SNAPSHOT_LABEL: &str = "releasaurus:snapshot";

/// A release pull request proposed for one or more components.
#[derive(Debug)]
pub struct ReleasePullRequest {
    pub title: PullRequestTitle,
    pub body: PullRequestBody,
    pub updates: Vec<Update>,
    pub labels: Vec<String>,
    pub head_ref_name: String,
    pub version: Option<Version>,
    pub draft: bool,
    pub group: Option<String>,
}

/// A release pull request produced for the package at `path`.
#[derive(Debug)]
pub struct CandidateReleasePullRequest {
    pub path: String,
    pub pull_request: ReleasePullRequest,
    pub config: PackageConfig,
}

/// Serializable view of a candidate, as printed by the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSummary {
    pub path: String,
    pub title: String,
    pub head_ref_name: String,
    pub version: Option<String>,
    pub labels: Vec<String>,
    pub draft: bool,
    pub body: String,
    pub files: Vec<String>,
}

impl CandidateReleasePullRequest {
    pub fn summary(&self) -> CandidateSummary {
        let pr = &self.pull_request;
        CandidateSummary {
            path: self.path.clone(),
            title: pr.title.to_string(),
            head_ref_name: pr.head_ref_name.clone(),
            version: pr.version.as_ref().map(|v| v.to_string()),
            labels: pr.labels.clone(),
            draft: pr.draft,
            body: pr.body.to_string(),
            files: pr.updates.iter().map(|u| u.path.clone()).collect(),
        }
    }
}

/// A merged release pull request, the input to release building.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MergedPullRequest {
    pub title: String,
    pub body: String,
    pub head_branch_name: String,
    pub sha: String,
    pub labels: Vec<String>,
}
