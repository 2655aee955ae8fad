//! Builds the releases published by a merged release pull request.
use log::*;
use std::path::Path;
use tokio::fs;

use releasaurus_planner::{pull_request::MergedPullRequest, result::Result};

use crate::{cli::Args, command::common};

/// The merged pull request as passed on the command line.
pub struct MergedArgs<'a> {
    pub title: &'a str,
    pub body_file: &'a Path,
    pub head_branch: &'a str,
    pub sha: &'a str,
    pub labels: &'a [String],
}

/// Execute the release command.
pub async fn execute(
    args: &Args,
    merged: MergedArgs<'_>,
    out_file: Option<&Path>,
) -> Result<()> {
    let (planner, _) =
        common::load_planner(&args.repo, &args.config_path()).await?;

    let merged = MergedPullRequest {
        title: merged.title.to_string(),
        body: fs::read_to_string(merged.body_file).await?,
        head_branch_name: merged.head_branch.to_string(),
        sha: merged.sha.to_string(),
        labels: merged.labels.to_vec(),
    };

    let releases = planner.build_releases(&merged).await?;
    if releases.is_empty() {
        warn!("no releases found in pull request: {}", merged.title);
    }

    common::write_json(&releases, out_file).await
}
