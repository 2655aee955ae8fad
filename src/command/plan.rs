//! Plans release pull requests and optionally applies their updates.
use log::*;
use std::path::Path;
use tokio::fs;

use releasaurus_planner::{
    PlanInput, pull_request::CandidateReleasePullRequest,
    repository::LocalRepository, result::Result,
};

use crate::{cli::Args, command::common};

/// Execute the plan command.
pub async fn execute(
    args: &Args,
    input: &Path,
    out_file: Option<&Path>,
    write: bool,
) -> Result<()> {
    let (planner, repository) =
        common::load_planner(&args.repo, &args.config_path()).await?;

    info!("reading package histories from {}", input.display());
    let content = fs::read_to_string(input).await?;
    let input: PlanInput = serde_json::from_str(&content)?;

    let candidates = planner.build_candidates(&input).await?;
    if candidates.is_empty() {
        info!("nothing to release");
    }

    if write {
        apply_updates(
            &repository,
            &planner.config().target_branch,
            &candidates,
        )
        .await?;
    }

    let summaries: Vec<_> = candidates.iter().map(|c| c.summary()).collect();
    common::write_json(&summaries, out_file).await
}

/// Writes the new content of every planned update to the checkout.
pub async fn apply_updates(
    repository: &LocalRepository,
    branch: &str,
    candidates: &[CandidateReleasePullRequest],
) -> Result<()> {
    for candidate in candidates {
        for update in &candidate.pull_request.updates {
            let Some(content) = update.apply(repository, branch).await? else {
                continue;
            };
            info!("{}: writing {}", candidate.path, update.path);
            repository.write_file(&update.path, &content).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use releasaurus_planner::{
        PackageHistory, Planner,
        commit::ConventionalCommit,
        config::{PackageConfig, PlannerConfig, ReleaseType},
    };
    use std::{collections::BTreeMap, sync::Arc};

    #[tokio::test]
    async fn writes_planned_updates_to_checkout() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("web")).unwrap();
        std::fs::write(
            dir.path().join("web/package.json"),
            r#"{"name": "web", "version": "1.0.0"}"#,
        )
        .unwrap();
        let repository = Arc::new(LocalRepository::new(dir.path()));

        let config = PlannerConfig {
            packages: BTreeMap::from([(
                "web".to_string(),
                PackageConfig {
                    release_type: ReleaseType::Node,
                    ..Default::default()
                },
            )]),
            ..Default::default()
        };
        let planner = Planner::builder()
            .config(config)
            .repository(repository.clone())
            .build()
            .unwrap();

        let input = PlanInput {
            packages: BTreeMap::from([(
                "web".to_string(),
                PackageHistory {
                    commits: vec![ConventionalCommit {
                        sha: "abc".into(),
                        message: "feat: dark mode".into(),
                        commit_type: "feat".into(),
                        bare_message: "dark mode".into(),
                        ..Default::default()
                    }],
                    latest_release: None,
                },
            )]),
        };
        let candidates = planner.build_candidates(&input).await.unwrap();

        apply_updates(&repository, "main", &candidates).await.unwrap();

        let manifest =
            std::fs::read_to_string(dir.path().join("web/package.json"))
                .unwrap();
        assert!(manifest.contains(r#""version": "1.0.0""#));
        let changelog =
            std::fs::read_to_string(dir.path().join("web/CHANGELOG.md"))
                .unwrap();
        assert!(changelog.contains("dark mode"));
    }
}
