//! Release pull request assembly for a single package.
//!
//! [`Strategy`] runs the shared flow: commits are turned into a version,
//! release notes and file updates, then rendered into a
//! [`ReleasePullRequest`]. Ecosystem specifics (manifests, snapshot bumps,
//! component naming) are delegated to an [`Ecosystem`]. The same strategy
//! parses merged pull requests back into releases.
use derive_builder::Builder;
use log::*;
use std::sync::Arc;

use crate::{
    changelog_notes::{
        ChangelogNotes, ChangelogSection, NotesContextBuilder, is_empty_notes,
    },
    commit::{ConventionalCommit, find_release_as},
    config::{DEFAULT_TARGET_BRANCH, ExtraFile, ExtraFileType, PackageConfig},
    error::PlannerError,
    path_helpers::{ROOT_PROJECT_PATH, add_path, is_root},
    pull_request::{
        BranchName, MergedPullRequest, PullRequestBody, PullRequestTitle,
        ReleaseData, ReleasePullRequest, SNAPSHOT_LABEL,
    },
    release::{CandidateRelease, Release, TagName},
    repository::{FileContents, RepositoryFiles},
    result::Result,
    updater::{
        Update, changelog::Changelog, generic::Generic,
        generic_json::GenericJson, generic_toml::GenericToml,
        generic_xml::GenericXml, merge_updates, pom_xml::PomXml,
    },
    version::{Version, VersionsMap},
    versioning::{VersioningRegistry, VersioningStrategy},
};

pub mod ecosystem;
pub mod expo;
pub mod generic;
pub mod java;
pub mod node;

pub use ecosystem::{BuildUpdatesOptions, Ecosystem, ecosystem_for};
pub use java::SNAPSHOT_NOTES;

/// Package scoped repository access handed to the ecosystem hooks.
pub struct StrategyContext {
    pub repository: Arc<dyn RepositoryFiles>,
    pub path: String,
    pub target_branch: String,
    pub config: PackageConfig,
}

impl StrategyContext {
    pub fn new(
        repository: Arc<dyn RepositoryFiles>,
        path: impl Into<String>,
        target_branch: impl Into<String>,
        config: PackageConfig,
    ) -> Self {
        Self {
            repository,
            path: path.into(),
            target_branch: target_branch.into(),
            config,
        }
    }

    /// Resolves `file` against the package path.
    pub fn add_path(&self, file: &str) -> Result<String> {
        add_path(&self.path, file)
    }

    /// Fetches `path` from the target branch. Absence is reported as
    /// [`PlannerError::MissingRequiredFile`].
    pub async fn fetch_required(&self, path: &str) -> Result<FileContents> {
        self.repository
            .get_file_contents_on_branch(
                path.to_string(),
                self.target_branch.clone(),
            )
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    PlannerError::MissingRequiredFile(path.to_string())
                } else {
                    err
                }
            })
    }

    /// Repository paths of every file named `filename` under the package.
    pub async fn find_files(&self, filename: &str) -> Result<Vec<String>> {
        let prefix = (!is_root(&self.path)).then(|| self.path.clone());
        let found = self
            .repository
            .find_files_by_filename_and_ref(
                filename.to_string(),
                self.target_branch.clone(),
                prefix,
            )
            .await?;

        found.iter().map(|file| self.add_path(file)).collect()
    }

    /// Repository paths an extra file refers to. Globs are expanded on the
    /// target branch, under the package path unless root-anchored.
    pub async fn extra_file_paths(&self, file: &ExtraFile) -> Result<Vec<String>> {
        if !file.glob {
            return Ok(vec![self.add_path(&file.path)?]);
        }

        let anchored = file.path.starts_with('/');
        let prefix =
            (!anchored && !is_root(&self.path)).then(|| self.path.clone());
        let found = self
            .repository
            .find_files_by_glob_and_ref(
                file.path.trim_start_matches('/').to_string(),
                self.target_branch.clone(),
                prefix.clone(),
            )
            .await?;
        debug!("glob {} matched {} files", file.path, found.len());

        found
            .iter()
            .map(|path| match prefix {
                Some(_) => self.add_path(path),
                None => add_path(ROOT_PROJECT_PATH, path),
            })
            .collect()
    }
}

#[derive(Builder)]
#[builder(build_fn(private, name = "_build"))]
pub struct StrategyParams {
    pub repository: Arc<dyn RepositoryFiles>,
    #[builder(setter(into))]
    pub path: String,
    #[builder(default)]
    pub config: PackageConfig,
    #[builder(setter(into), default = "DEFAULT_TARGET_BRANCH.into()")]
    pub target_branch: String,
    #[builder(setter(into), default)]
    pub repository_url: Option<String>,
    #[builder(default = "vec![SNAPSHOT_LABEL.into()]")]
    pub snapshot_labels: Vec<String>,
}

impl StrategyParamsBuilder {
    pub fn build(&self) -> Result<Strategy> {
        self.build_with_registry(&VersioningRegistry::default())
    }

    /// Builds the strategy resolving the versioning key through `registry`.
    pub fn build_with_registry(
        &self,
        registry: &VersioningRegistry,
    ) -> Result<Strategy> {
        let params = self.params()?;
        Strategy::new(params, registry)
    }

    fn params(&self) -> Result<StrategyParams> {
        self._build().map_err(|e| {
            PlannerError::configuration(format!(
                "Failed to build strategy: {}",
                e
            ))
        })
    }
}

/// Builds release pull requests and releases for the package at one path.
pub struct Strategy {
    context: StrategyContext,
    repository_url: Option<String>,
    snapshot_labels: Vec<String>,
    ecosystem: Box<dyn Ecosystem>,
    versioning: Box<dyn VersioningStrategy>,
    snapshot_versioning: Option<Box<dyn VersioningStrategy>>,
    changelog_notes: ChangelogNotes,
}

impl Strategy {
    pub fn builder() -> StrategyParamsBuilder {
        StrategyParamsBuilder::default()
    }

    pub fn new(
        params: StrategyParams,
        registry: &VersioningRegistry,
    ) -> Result<Self> {
        let config = params.config;
        let ecosystem = ecosystem_for(config.release_type);
        let options = config.versioning_options();

        let versioning = ecosystem
            .wrap_versioning(registry.build(&config.versioning, &options)?);
        let snapshot_versioning = ecosystem
            .snapshot_versioning(registry.build(&config.versioning, &options)?);

        Ok(Self {
            context: StrategyContext::new(
                params.repository,
                params.path,
                params.target_branch,
                config,
            ),
            repository_url: params.repository_url,
            snapshot_labels: params.snapshot_labels,
            ecosystem,
            versioning,
            snapshot_versioning,
            changelog_notes: ChangelogNotes::default(),
        })
    }

    pub fn path(&self) -> &str {
        &self.context.path
    }

    pub fn config(&self) -> &PackageConfig {
        &self.context.config
    }

    pub fn normalize_component(&self, component: &str) -> String {
        self.ecosystem.normalize_component(component)
    }

    /// Configured package name, else the one declared by the manifest.
    pub async fn default_package_name(&self) -> Result<Option<String>> {
        if let Some(name) = &self.context.config.package_name {
            return Ok(Some(name.clone()));
        }
        self.ecosystem.default_package_name(&self.context).await
    }

    /// Component of the package whether or not it appears in tags.
    pub async fn component_name(&self) -> Result<String> {
        if let Some(component) = &self.context.config.component {
            return Ok(component.clone());
        }

        Ok(self
            .default_package_name()
            .await?
            .map(|name| self.normalize_component(&name))
            .unwrap_or_default())
    }

    /// Component used in tags, titles and branch names. Empty when the
    /// package does not include its component in tags.
    pub async fn component(&self) -> Result<String> {
        if !self.context.config.include_component_in_tag {
            return Ok(String::new());
        }
        self.component_name().await
    }

    fn changelog_sections(&self) -> Vec<ChangelogSection> {
        self.context
            .config
            .changelog_sections
            .clone()
            .unwrap_or_else(|| self.ecosystem.changelog_sections())
    }

    fn initial_version(&self) -> Version {
        self.context
            .config
            .initial_version
            .clone()
            .unwrap_or_else(|| self.ecosystem.initial_version())
    }

    fn build_new_version(
        &self,
        commits: &[ConventionalCommit],
        latest_release: Option<&Release>,
    ) -> Result<Version> {
        if let Some(version) = self.context.config.release_as_version()? {
            info!("{}: releasing as configured {version}", self.path());
            return Ok(version);
        }

        if let Some(release_as) = find_release_as(commits) {
            info!("{}: found RELEASE AS {release_as}", self.path());
            return Version::parse_tag(release_as);
        }

        match latest_release {
            Some(release) => self.versioning.bump(&release.tag.version, commits),
            None => {
                let version = self.initial_version();
                info!("{}: no prior release, using {version}", self.path());
                Ok(version)
            }
        }
    }

    fn bump_versions_map(
        versions: VersionsMap,
        versioning: &dyn VersioningStrategy,
        commits: &[ConventionalCommit],
    ) -> Result<VersionsMap> {
        versions
            .into_iter()
            .map(|(name, version)| {
                let bumped = versioning.bump(&version, commits)?;
                debug!("bumping {name} from {version} to {bumped}");
                Ok((name, bumped))
            })
            .collect()
    }

    /// Builds the release pull request for `commits` since
    /// `latest_release`. `None` when there is nothing to release.
    pub async fn build_release_pull_request(
        &self,
        commits: Vec<ConventionalCommit>,
        latest_release: Option<&Release>,
        draft: bool,
        labels: &[String],
    ) -> Result<Option<ReleasePullRequest>> {
        let ctx = &self.context;

        if let Some(snapshot_versioning) = &self.snapshot_versioning
            && self
                .ecosystem
                .needs_snapshot(ctx, &commits, latest_release)
                .await?
        {
            info!("{}: building snapshot bump pull request", self.path());
            let pull_request = self
                .build_snapshot_pull_request(
                    snapshot_versioning.as_ref(),
                    latest_release,
                    draft,
                )
                .await?;
            return Ok(Some(pull_request));
        }

        let commits = self.ecosystem.post_process_commits(commits);
        if commits.is_empty() {
            info!("{}: no commits to release", self.path());
            return Ok(None);
        }

        let version = self.build_new_version(&commits, latest_release)?;
        let mut versions_map = Self::bump_versions_map(
            self.ecosystem.build_versions_map(ctx).await?,
            self.versioning.as_ref(),
            &commits,
        )?;
        self.ecosystem.finalize_versions_map(
            ctx,
            &mut versions_map,
            &self.component_name().await?,
            &version,
        );

        let config = &ctx.config;
        let component = Some(self.component().await?).filter(|c| !c.is_empty());
        let tag = TagName::new(
            version.clone(),
            component.clone(),
            &config.tag_separator,
            config.include_v_in_tag,
        );

        let notes_context = NotesContextBuilder::default()
            .version(version.clone())
            .current_tag(tag.to_string())
            .previous_tag(latest_release.map(|r| r.tag.to_string()))
            .repository_url(self.repository_url.clone())
            .sections(self.changelog_sections())
            .build()
            .map_err(|e| PlannerError::configuration(e.to_string()))?;
        let notes = self.changelog_notes.build_notes(&commits, &notes_context)?;

        if is_empty_notes(&notes) {
            info!("{}: no user facing commits, skipping", self.path());
            return Ok(None);
        }

        let options = BuildUpdatesOptions {
            new_version: &version,
            versions_map: &versions_map,
            latest_version: latest_release.map(|r| &r.tag.version),
            is_snapshot: false,
        };
        let mut updates = self.ecosystem.build_updates(ctx, &options).await?;
        updates.push(Update::creating(
            ctx.add_path(&config.changelog_path)?,
            Changelog::new(version.clone(), notes.clone()),
        ));
        updates.extend(self.extra_file_updates(&version).await?);

        Ok(Some(self.pull_request(
            component,
            version,
            notes,
            merge_updates(updates),
            labels.to_vec(),
            draft,
        )))
    }

    async fn build_snapshot_pull_request(
        &self,
        versioning: &dyn VersioningStrategy,
        latest_release: Option<&Release>,
        draft: bool,
    ) -> Result<ReleasePullRequest> {
        let ctx = &self.context;
        let version = match latest_release {
            Some(release) => versioning.bump(&release.tag.version, &[])?,
            None => self.initial_version(),
        };

        let mut versions_map = Self::bump_versions_map(
            self.ecosystem.build_versions_map(ctx).await?,
            versioning,
            &[],
        )?;
        self.ecosystem.finalize_versions_map(
            ctx,
            &mut versions_map,
            &self.component_name().await?,
            &version,
        );

        let options = BuildUpdatesOptions {
            new_version: &version,
            versions_map: &versions_map,
            latest_version: latest_release.map(|r| &r.tag.version),
            is_snapshot: true,
        };
        let updates = self.ecosystem.build_updates(ctx, &options).await?;
        let component = Some(self.component().await?).filter(|c| !c.is_empty());

        Ok(self.pull_request(
            component,
            version,
            SNAPSHOT_NOTES.to_string(),
            merge_updates(updates),
            self.snapshot_labels.clone(),
            draft,
        ))
    }

    async fn extra_file_updates(&self, version: &Version) -> Result<Vec<Update>> {
        let mut updates = vec![];

        for file in self.context.config.extra_files()? {
            let selector = file.jsonpath.clone().unwrap_or_default();
            for path in self.context.extra_file_paths(&file).await? {
                let version = version.clone();
                let update = match file.file_type {
                    ExtraFileType::Generic => {
                        Update::new(path, Generic::new(version)?)
                    }
                    ExtraFileType::Json => {
                        Update::new(path, GenericJson::new(&selector, version)?)
                    }
                    ExtraFileType::Toml => {
                        Update::new(path, GenericToml::new(&selector, version)?)
                    }
                    ExtraFileType::Xml => Update::new(
                        path,
                        GenericXml::new(
                            file.xpath.clone().unwrap_or_default(),
                            version,
                        )?,
                    ),
                    ExtraFileType::Pom => Update::new(path, PomXml::new(version)),
                };
                updates.push(update);
            }
        }

        Ok(updates)
    }

    fn pull_request(
        &self,
        component: Option<String>,
        version: Version,
        notes: String,
        updates: Vec<Update>,
        labels: Vec<String>,
        draft: bool,
    ) -> ReleasePullRequest {
        let ctx = &self.context;
        let title = PullRequestTitle::new(
            component.clone(),
            Some(ctx.target_branch.clone()),
            Some(version.clone()),
            ctx.config.pull_request_title_pattern.as_deref(),
        );
        let branch = BranchName::new(&ctx.target_branch, component.clone());
        let body = PullRequestBody::new(
            vec![ReleaseData {
                component,
                version: Some(version.clone()),
                notes,
            }],
            false,
        );

        ReleasePullRequest {
            title,
            body,
            updates,
            labels,
            head_ref_name: branch.to_string(),
            version: Some(version),
            draft,
            group: None,
        }
    }

    /// Rebuilds the release of this package from a merged release pull
    /// request. `None` when the pull request is not a release pull request
    /// for this package.
    pub async fn build_release(
        &self,
        merged: &MergedPullRequest,
    ) -> Result<Option<CandidateRelease>> {
        let config = &self.context.config;
        let path = self.path();

        if merged.sha.is_empty() {
            error!("{path}: merged pull request has no sha");
            return Ok(None);
        }

        let Some(branch) = BranchName::parse(&merged.head_branch_name) else {
            info!("{path}: {} is not a release branch", merged.head_branch_name);
            return Ok(None);
        };

        let Some(title) = PullRequestTitle::parse(
            &merged.title,
            config.pull_request_title_pattern.as_deref(),
        )?
        else {
            error!("{path}: unable to parse pull request title: {}", merged.title);
            return Ok(None);
        };

        let Some(body) = PullRequestBody::parse(&merged.body) else {
            error!("{path}: unable to parse pull request body");
            return Ok(None);
        };

        let component = self.component().await?;
        let normalized = self.normalize_component(&component);
        let is_ours = |other: Option<&str>| {
            self.normalize_component(other.unwrap_or_default()) == normalized
        };

        // A merged pull request is titled after its root package only.
        let grouped = body.releases.len() > 1;
        let foreign = |other: Option<&str>| other.is_some() && !is_ours(other);
        if foreign(branch.component.as_deref())
            || (!grouped && foreign(title.component.as_deref()))
        {
            debug!("{path}: pull request belongs to another component");
            return Ok(None);
        }

        let release_data = match body.releases.as_slice() {
            [single] if single.component.is_none() => Some(single),
            releases => releases.iter().find(|release| {
                release.component.is_some()
                    && is_ours(release.component.as_deref())
            }),
        };
        let Some(release_data) = release_data else {
            debug!("{path}: no release notes for component '{component}'");
            return Ok(None);
        };

        let version = if grouped {
            release_data.version.clone().or(title.version)
        } else {
            title.version.or_else(|| release_data.version.clone())
        };
        let Some(version) = version else {
            error!("{path}: unable to determine the released version");
            return Ok(None);
        };

        if !self.ecosystem.is_valid_release(&version) {
            info!("{path}: {version} is not a releasable version, skipping");
            return Ok(None);
        }

        let component = Some(component).filter(|c| !c.is_empty());
        let name = match &component {
            Some(component) => format!("{component}: v{version}"),
            None => format!("v{version}"),
        };
        let tag = TagName::new(
            version.clone(),
            component,
            &config.tag_separator,
            config.include_v_in_tag,
        );

        Ok(Some(CandidateRelease {
            name,
            tag,
            notes: release_data.notes.clone(),
            sha: merged.sha.clone(),
            path: path.to_string(),
            draft: config.draft,
            prerelease: version.pre_release.is_some(),
        }))
    }
}
