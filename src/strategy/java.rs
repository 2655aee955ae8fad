use async_trait::async_trait;
use log::*;
use tokio::sync::OnceCell;

use crate::{
    changelog_notes::{ChangelogSection, java_changelog_sections},
    commit::ConventionalCommit,
    config::ExtraFileType,
    pull_request::PullRequestTitle,
    release::Release,
    repository::FileContents,
    result::Result,
    strategy::{
        StrategyContext,
        ecosystem::{BuildUpdatesOptions, Ecosystem},
    },
    updater::{
        Update, generic::Generic, java_update::JavaUpdate, pom_xml::PomXml,
        versions_manifest::VersionsManifest,
    },
    version::{Version, VersionsMap},
    versioning::{
        JavaAddSnapshotStrategy, JavaSnapshotStrategy, VersioningStrategy,
    },
};

/// Notes of a snapshot bump pull request.
pub const SNAPSHOT_NOTES: &str =
    "### Updating meta-information for bleeding-edge SNAPSHOT release.";

const BUILD_FILES: [&str; 3] =
    ["pom.xml", "build.gradle", "dependencies.properties"];

/// Maven and Gradle projects, released alternately as a version and a
/// `-SNAPSHOT` development bump.
#[derive(Debug, Default)]
pub struct JavaEcosystem {
    versions_file: OnceCell<FileContents>,
}

impl JavaEcosystem {
    async fn versions_file(
        &self,
        ctx: &StrategyContext,
        file: &str,
    ) -> Result<&FileContents> {
        self.versions_file
            .get_or_try_init(|| async {
                let path = ctx.add_path(file)?;
                ctx.fetch_required(&path).await
            })
            .await
    }

    /// A commit merged through a snapshot bump pull request.
    fn is_snapshot_bump(
        commit: &ConventionalCommit,
        pattern: Option<&str>,
    ) -> Result<bool> {
        let title = commit
            .pull_request_title
            .as_deref()
            .unwrap_or(&commit.message);

        Ok(PullRequestTitle::parse(title, pattern)?
            .and_then(|title| title.version)
            .is_some_and(|version| version.is_snapshot()))
    }

    fn fake_commit() -> ConventionalCommit {
        ConventionalCommit {
            sha: "fake".into(),
            message: "fake commit".into(),
            commit_type: "fake".into(),
            bare_message: "fake commit".into(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Ecosystem for JavaEcosystem {
    fn changelog_sections(&self) -> Vec<ChangelogSection> {
        java_changelog_sections()
    }

    fn wrap_versioning(
        &self,
        versioning: Box<dyn VersioningStrategy>,
    ) -> Box<dyn VersioningStrategy> {
        Box::new(JavaSnapshotStrategy::new(versioning))
    }

    fn snapshot_versioning(
        &self,
        versioning: Box<dyn VersioningStrategy>,
    ) -> Option<Box<dyn VersioningStrategy>> {
        Some(Box::new(JavaAddSnapshotStrategy::new(versioning)))
    }

    fn initial_version(&self) -> Version {
        Version::new(0, 1, 0)
    }

    fn post_process_commits(
        &self,
        commits: Vec<ConventionalCommit>,
    ) -> Vec<ConventionalCommit> {
        if commits.is_empty() {
            return vec![Self::fake_commit()];
        }
        commits
    }

    fn is_valid_release(&self, version: &Version) -> bool {
        !version.is_snapshot()
    }

    async fn build_versions_map(
        &self,
        ctx: &StrategyContext,
    ) -> Result<VersionsMap> {
        match &ctx.config.versions_file {
            Some(file) => {
                let contents = self.versions_file(ctx, file).await?;
                Ok(VersionsManifest::parse_versions(&contents.parsed_content))
            }
            None => Ok(VersionsMap::new()),
        }
    }

    fn finalize_versions_map(
        &self,
        ctx: &StrategyContext,
        versions: &mut VersionsMap,
        component: &str,
        version: &Version,
    ) {
        // a versions manifest already lists the package's own artifacts
        if ctx.config.versions_file.is_some() || component.is_empty() {
            return;
        }
        versions
            .entry(component.to_string())
            .or_insert_with(|| version.clone());
    }

    async fn needs_snapshot(
        &self,
        ctx: &StrategyContext,
        commits: &[ConventionalCommit],
        latest_release: Option<&Release>,
    ) -> Result<bool> {
        if ctx.config.skip_snapshot {
            return Ok(false);
        }

        if let Some(file) = &ctx.config.versions_file {
            let contents = self.versions_file(ctx, file).await?;
            return Ok(VersionsManifest::needs_snapshot(
                &contents.parsed_content,
            ));
        }

        let Some(latest) = latest_release else {
            return Ok(false);
        };
        if latest.tag.version.is_snapshot() {
            return Ok(false);
        }

        let pattern = ctx.config.pull_request_title_pattern.as_deref();
        for commit in commits {
            if Self::is_snapshot_bump(commit, pattern)? {
                debug!("found snapshot bump commit {}", commit.sha);
                return Ok(false);
            }
        }

        Ok(true)
    }

    async fn build_updates(
        &self,
        ctx: &StrategyContext,
        options: &BuildUpdatesOptions<'_>,
    ) -> Result<Vec<Update>> {
        let version = options.new_version;
        let mut updates = vec![];

        for build_file in BUILD_FILES {
            for path in ctx.find_files(build_file).await? {
                if build_file == "pom.xml" {
                    updates.push(Update::new(&path, PomXml::new(version.clone())));
                }
                updates.push(Update::new(&path, Generic::new(version.clone())?));
                if !options.is_snapshot {
                    updates.push(Update::new(
                        &path,
                        Generic::java_released(version.clone())?,
                    ));
                }
            }
        }

        for file in ctx.config.extra_files()? {
            if file.file_type != ExtraFileType::Generic {
                continue;
            }
            for path in ctx.extra_file_paths(&file).await? {
                updates.push(Update::new(
                    &path,
                    JavaUpdate::new(
                        options.versions_map.clone(),
                        options.is_snapshot,
                    ),
                ));
                if !options.is_snapshot {
                    updates.push(Update::new(
                        &path,
                        Generic::java_released(version.clone())?,
                    ));
                }
            }
        }

        if let Some(file) = &ctx.config.versions_file {
            let contents = self.versions_file(ctx, file).await?;
            updates.push(
                Update::new(
                    ctx.add_path(file)?,
                    VersionsManifest::new(
                        options.versions_map.clone(),
                        options.is_snapshot,
                    ),
                )
                .with_cached_contents(contents.clone()),
            );
        }

        Ok(updates)
    }
}
