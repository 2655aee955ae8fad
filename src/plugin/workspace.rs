//! Version propagation through a workspace's dependency graph.
use async_trait::async_trait;
use log::*;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
};

use crate::{
    config::PackageConfig,
    error::PlannerError,
    path_helpers::is_within,
    plugin::{
        Plugin, PluginContext,
        dependency_notes::append_dependencies_section_to_changelog,
        graph::DependencyGraph, merge::merge_candidates,
    },
    pull_request::{
        BranchName, CandidateReleasePullRequest, PullRequestBody,
        PullRequestTitle, ReleaseData, ReleasePullRequest,
    },
    result::Result,
    updater::{
        CompositeUpdater, Update, Updater, changelog::Changelog,
        release_manifest::ReleaseManifest,
    },
    version::{Version, VersionsMap},
};

/// Candidates indexed by the name of the package they release.
#[derive(Debug, Default)]
pub struct CandidateIndex {
    by_package: BTreeMap<String, usize>,
    paths: Vec<String>,
}

impl CandidateIndex {
    pub fn new(candidates: &[CandidateReleasePullRequest]) -> Self {
        Self {
            by_package: BTreeMap::new(),
            paths: candidates.iter().map(|c| c.path.clone()).collect(),
        }
    }

    pub fn insert(&mut self, package_name: impl Into<String>, index: usize) {
        self.by_package.insert(package_name.into(), index);
    }

    pub fn get(&self, package_name: &str) -> Option<usize> {
        self.by_package.get(package_name).copied()
    }

    pub fn names(&self) -> Vec<String> {
        self.by_package.keys().cloned().collect()
    }

    /// Indexes of candidates matched to at least one package.
    pub fn indexes(&self) -> BTreeSet<usize> {
        self.by_package.values().copied().collect()
    }

    /// Paths of candidates matched to at least one package.
    pub fn paths(&self) -> Vec<&str> {
        self.indexes()
            .into_iter()
            .filter_map(|idx| self.paths.get(idx).map(String::as_str))
            .collect()
    }

    /// The indexed candidate whose path most closely encloses `path`.
    pub fn nearest(&self, path: &str) -> Option<usize> {
        self.indexes()
            .into_iter()
            .filter_map(|idx| self.paths.get(idx).map(|p| (idx, p)))
            .filter(|(_, candidate_path)| {
                path != candidate_path.as_str() && is_within(path, candidate_path)
            })
            .max_by_key(|(_, candidate_path)| candidate_path.len())
            .map(|(idx, _)| idx)
    }
}

/// Every package of the workspace and the candidates matched to them.
#[derive(Debug)]
pub struct AllPackages<P> {
    pub packages: Vec<P>,
    pub index: CandidateIndex,
}

/// Ecosystem specific behaviour of [`WorkspacePlugin`].
#[async_trait]
pub trait WorkspaceAdapter: Send + Sync {
    type Package: Debug + Send + Sync;

    fn name(&self) -> &'static str;

    /// Whether a candidate belongs to this ecosystem.
    fn in_scope(&self, candidate: &CandidateReleasePullRequest) -> bool;

    fn package_name<'a>(&self, package: &'a Self::Package) -> &'a str;

    fn package_path<'a>(&self, package: &'a Self::Package) -> &'a str;

    /// Names of everything the package depends on. Names outside the
    /// workspace are dropped by the graph.
    fn dependency_names(&self, package: &Self::Package) -> Vec<String>;

    /// Discovers and parses every package. Packages missing identity
    /// fields are logged and left out.
    async fn build_all_packages(
        &self,
        candidates: &[CandidateReleasePullRequest],
    ) -> Result<AllPackages<Self::Package>>;

    /// Packages whose dependents must be updated.
    fn package_names_to_update(
        &self,
        _graph: &DependencyGraph<&Self::Package>,
        index: &CandidateIndex,
    ) -> Vec<String> {
        index.names()
    }

    fn find_candidate(
        &self,
        package: &Self::Package,
        index: &CandidateIndex,
    ) -> Option<usize> {
        index.get(self.package_name(package))
    }

    /// Versions known before the walk, e.g. read back from candidate
    /// manifest updates.
    async fn seed_versions(
        &self,
        _candidates: &[CandidateReleasePullRequest],
        _index: &CandidateIndex,
    ) -> Result<VersionsMap> {
        Ok(VersionsMap::new())
    }

    /// Forced bump of a package released only because a dependency was.
    fn bump_version(&self, package: &Self::Package) -> Result<Version>;

    /// Whether a version is recorded in the release manifest.
    fn is_release_version(&self, _version: &Version) -> bool {
        true
    }

    fn update_candidate(
        &self,
        candidate: CandidateReleasePullRequest,
        package: &Self::Package,
        versions: &VersionsMap,
    ) -> Result<CandidateReleasePullRequest>;

    fn new_candidate(
        &self,
        package: &Self::Package,
        versions: &VersionsMap,
    ) -> Result<CandidateReleasePullRequest>;
}

#[derive(Debug, Clone, Default)]
pub struct WorkspaceOptions {
    pub merge: bool,
    pub manifest_path: Option<String>,
}

/// Releases every package depending on a released package, updating
/// manifests and notes along the way.
pub struct WorkspacePlugin<A> {
    adapter: A,
    ctx: PluginContext,
    options: WorkspaceOptions,
}

impl<A: WorkspaceAdapter> WorkspacePlugin<A> {
    pub fn new(adapter: A, ctx: PluginContext, options: WorkspaceOptions) -> Self {
        Self {
            adapter,
            ctx,
            options,
        }
    }

    /// New versions by package name, and real releases by package path.
    async fn updated_versions(
        &self,
        ordered: &[&A::Package],
        candidates: &[CandidateReleasePullRequest],
        index: &CandidateIndex,
    ) -> Result<(VersionsMap, VersionsMap)> {
        let mut versions = self.adapter.seed_versions(candidates, index).await?;
        let mut path_versions = VersionsMap::new();

        for idx in index.indexes() {
            let candidate = &candidates[idx];
            if let Some(version) = &candidate.pull_request.version
                && self.adapter.is_release_version(version)
            {
                path_versions.insert(candidate.path.clone(), version.clone());
            }
        }

        for package in ordered {
            let name = self.adapter.package_name(package);

            if let Some(idx) = index.get(name) {
                let version = candidates[idx]
                    .pull_request
                    .version
                    .clone()
                    .ok_or_else(|| PlannerError::UnknownComponent(name.into()))?;
                debug!("{name}: version {version} from candidate");
                versions.insert(name.to_string(), version);
                continue;
            }

            if versions.contains_key(name) {
                debug!("{name}: version already set");
                continue;
            }

            let version = self.adapter.bump_version(package)?;
            debug!("{name}: forced bump to {version}");
            if self.adapter.is_release_version(&version) {
                path_versions.insert(
                    self.adapter.package_path(package).to_string(),
                    version.clone(),
                );
            }
            versions.insert(name.to_string(), version);
        }

        Ok((versions, path_versions))
    }
}

#[async_trait]
impl<A> Plugin for WorkspacePlugin<A>
where
    A: WorkspaceAdapter,
{
    fn name(&self) -> &'static str {
        self.adapter.name()
    }

    async fn run(
        &self,
        candidates: Vec<CandidateReleasePullRequest>,
    ) -> Result<Vec<CandidateReleasePullRequest>> {
        let (in_scope, mut out_of_scope): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|candidate| self.adapter.in_scope(candidate));

        if in_scope.is_empty() {
            info!("{}: no in-scope candidates", self.name());
            return Ok(out_of_scope);
        }

        let AllPackages { packages, index } =
            self.adapter.build_all_packages(&in_scope).await?;
        info!(
            "{}: building dependency graph for {} packages",
            self.name(),
            packages.len()
        );

        let graph = DependencyGraph::build(
            packages
                .iter()
                .map(|package| {
                    (
                        self.adapter.package_name(package).to_string(),
                        package,
                        self.adapter.dependency_names(package),
                    )
                })
                .collect(),
        );

        let seeds = self.adapter.package_names_to_update(&graph, &index);
        let ordered: Vec<&A::Package> =
            graph.with_dependents(&seeds)?.into_iter().copied().collect();
        info!("{}: updating {} packages", self.name(), ordered.len());

        let (versions, path_versions) =
            self.updated_versions(&ordered, &in_scope, &index).await?;

        let mut slots: Vec<Option<CandidateReleasePullRequest>> =
            in_scope.into_iter().map(Some).collect();
        let mut updated = vec![];
        let mut seen_paths = BTreeSet::new();

        for package in ordered {
            let name = self.adapter.package_name(package);

            match self.adapter.find_candidate(package, &index) {
                Some(idx) => {
                    let Some(candidate) = slots.get_mut(idx).and_then(Option::take)
                    else {
                        debug!("{name}: candidate already updated");
                        continue;
                    };
                    info!("{name}: updating candidate at {}", candidate.path);
                    let candidate =
                        self.adapter.update_candidate(candidate, package, &versions)?;
                    seen_paths.insert(candidate.path.clone());
                    updated.push(candidate);
                }
                None => {
                    info!("{name}: creating candidate for dependency updates");
                    let candidate = self.adapter.new_candidate(package, &versions)?;
                    if seen_paths.insert(candidate.path.clone()) {
                        updated.push(candidate);
                    } else {
                        debug!("{name}: candidate for {} exists", candidate.path);
                    }
                }
            }
        }

        // candidates matched to no package pass through
        updated.extend(slots.into_iter().flatten());

        if self.options.merge && updated.len() > 1 {
            info!("{}: merging {} candidates", self.name(), updated.len());
            updated = vec![merge_candidates(updated, &self.ctx.target_branch, None)];
        }

        if let Some(manifest_path) = &self.options.manifest_path
            && !path_versions.is_empty()
            && let Some(first) = updated.first_mut()
        {
            first.pull_request.updates.push(Update::creating(
                manifest_path.clone(),
                ReleaseManifest::new(path_versions),
            ));
        }

        out_of_scope.extend(updated);
        Ok(out_of_scope)
    }
}

/// Changelog entry of a package released only for dependency updates.
pub(crate) fn dependency_changelog_entry(version: &Version, notes: &str) -> String {
    let date = chrono::Local::now().date_naive().format("%Y-%m-%d");
    format!(
        "## {version} ({date})\n\n{}",
        append_dependencies_section_to_changelog("", notes)
    )
}

/// Chains `updater` after any update already targeting `path`.
pub(crate) fn chain_update(
    updates: &mut Vec<Update>,
    path: &str,
    updater: impl Updater,
) {
    match updates.iter_mut().find(|update| update.path == path) {
        Some(update) => {
            let previous = std::mem::replace(
                &mut update.updater,
                Box::new(CompositeUpdater::default()),
            );
            update.updater =
                Box::new(CompositeUpdater::new(vec![previous, Box::new(updater)]));
        }
        None => updates.push(Update::new(path, updater)),
    }
}

/// Component the package's own strategy releases under: the configured
/// component, else the normalized package name. `None` when components are
/// left out of tags.
pub(crate) fn release_component(
    config: &PackageConfig,
    manifest_name: Option<&str>,
    normalize: fn(&str) -> String,
) -> Option<String> {
    if !config.include_component_in_tag {
        return None;
    }

    config
        .component
        .clone()
        .or_else(|| {
            config
                .package_name
                .as_deref()
                .or(manifest_name)
                .map(normalize)
        })
        .filter(|component| !component.is_empty())
}

/// Appends `notes` to every changelog entry reachable from `updater`,
/// including those chained inside composites.
fn append_to_changelogs(updater: &mut dyn Updater, notes: &str) {
    if let Some(changelog) = (*updater).as_any_mut().downcast_mut::<Changelog>() {
        changelog.changelog_entry = append_dependencies_section_to_changelog(
            &changelog.changelog_entry,
            notes,
        );
        return;
    }

    if let Some(composite) =
        (*updater).as_any_mut().downcast_mut::<CompositeUpdater>()
    {
        for inner in composite.updaters_mut() {
            append_to_changelogs(&mut **inner, notes);
        }
    }
}

/// Appends dependency notes to a candidate's changelog entries and to the
/// first release of its body.
pub(crate) fn add_dependency_notes(
    candidate: &mut CandidateReleasePullRequest,
    notes: &str,
) {
    if notes.is_empty() {
        return;
    }

    for update in candidate.pull_request.updates.iter_mut() {
        append_to_changelogs(&mut *update.updater, notes);
    }

    let component = candidate.pull_request.title.component.clone();
    let version = candidate.pull_request.version.clone();
    let releases = &mut candidate.pull_request.body.releases;
    match releases.first_mut() {
        Some(release) => {
            release.notes =
                append_dependencies_section_to_changelog(&release.notes, notes);
        }
        None => releases.push(ReleaseData {
            component,
            version,
            notes: append_dependencies_section_to_changelog("", notes),
        }),
    }
}

/// A candidate releasing a package only for its dependency updates. Titled,
/// branched and described like a strategy's own release pull request so it
/// parses back into the same release.
pub(crate) fn dependency_candidate(
    ctx: &PluginContext,
    path: &str,
    component: Option<String>,
    version: Version,
    changelog_entry: String,
    updates: Vec<Update>,
    config: PackageConfig,
) -> CandidateReleasePullRequest {
    let title = PullRequestTitle::new(
        component.clone(),
        Some(ctx.target_branch.clone()),
        Some(version.clone()),
        config.pull_request_title_pattern.as_deref(),
    );
    let branch = BranchName::new(&ctx.target_branch, component.clone());
    let body = PullRequestBody::new(
        vec![ReleaseData {
            component,
            version: Some(version.clone()),
            notes: changelog_entry,
        }],
        false,
    );

    CandidateReleasePullRequest {
        path: path.to_string(),
        pull_request: ReleasePullRequest {
            title,
            body,
            updates,
            labels: ctx.labels.clone(),
            head_ref_name: branch.to_string(),
            version: Some(version),
            draft: false,
            group: None,
        },
        config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_mock_files;
    use std::sync::Arc;

    fn candidate(path: &str) -> CandidateReleasePullRequest {
        let ctx = PluginContext {
            repository: Arc::new(create_mock_files(&[])),
            target_branch: "main".into(),
            packages: BTreeMap::new(),
            labels: vec![],
        };
        dependency_candidate(
            &ctx,
            path,
            Some(path.to_string()),
            Version::new(1, 0, 0),
            String::new(),
            vec![],
            PackageConfig::default(),
        )
    }

    #[test]
    fn nearest_prefers_longest_enclosing_path() {
        let candidates = vec![candidate("."), candidate("libs"), candidate("libs/core")];
        let mut index = CandidateIndex::new(&candidates);
        index.insert("root", 0);
        index.insert("libs", 1);
        index.insert("core", 2);

        assert_eq!(index.nearest("libs/core/api"), Some(2));
        assert_eq!(index.nearest("libs/util"), Some(1));
        assert_eq!(index.nearest("docs"), Some(0));
        assert_eq!(index.nearest("."), None);
    }

    #[test]
    fn chains_updates_on_same_path() {
        let mut updates = vec![Update::new(
            "pom.xml",
            Changelog::new(Version::new(1, 0, 0), "entry"),
        )];
        chain_update(&mut updates, "pom.xml", Changelog::new(Version::new(1, 0, 0), "x"));
        chain_update(&mut updates, "other.xml", Changelog::new(Version::new(1, 0, 0), "y"));

        assert_eq!(updates.len(), 2);
        let composite = updates[0].updater_as::<CompositeUpdater>().unwrap();
        assert_eq!(composite.updaters().len(), 2);
        assert!(updates[1].updater_as::<Changelog>().is_some());
    }

    #[test]
    fn dependency_notes_extend_changelog_and_body() {
        let mut candidate = candidate("web");
        candidate.pull_request.body.releases[0].notes = "## 1.0.0".into();
        candidate.pull_request.updates.push(Update::new(
            "web/CHANGELOG.md",
            Changelog::new(Version::new(1, 0, 0), "## 1.0.0"),
        ));

        add_dependency_notes(&mut candidate, "* deps");

        let changelog = candidate.pull_request.updates[0]
            .updater_as::<Changelog>()
            .unwrap();
        assert_eq!(
            changelog.changelog_entry,
            "## 1.0.0\n\n\n### Dependencies\n\n* deps"
        );
        assert_eq!(
            candidate.pull_request.body.releases[0].notes,
            "## 1.0.0\n\n\n### Dependencies\n\n* deps"
        );
    }

    #[test]
    fn dependency_notes_reach_chained_changelogs() {
        let mut candidate = candidate("web");
        let mut updates = vec![Update::new(
            "web/CHANGELOG.md",
            Changelog::new(Version::new(1, 0, 0), "## 1.0.0"),
        )];
        chain_update(
            &mut updates,
            "web/CHANGELOG.md",
            ReleaseManifest::new(BTreeMap::new()),
        );
        candidate.pull_request.updates = updates;

        add_dependency_notes(&mut candidate, "* deps");

        let composite = candidate.pull_request.updates[0]
            .updater_as::<CompositeUpdater>()
            .unwrap();
        let changelog = (*composite.updaters()[0])
            .as_any()
            .downcast_ref::<Changelog>()
            .unwrap();
        assert_eq!(
            changelog.changelog_entry,
            "## 1.0.0\n\n\n### Dependencies\n\n* deps"
        );
    }

    #[test]
    fn release_component_follows_strategy_naming() {
        let config = PackageConfig::default();
        assert_eq!(
            release_component(&config, Some("@acme/web"), |name| {
                name.trim_start_matches("@acme/").to_string()
            }),
            Some("web".to_string())
        );
        assert_eq!(release_component(&config, None, str::to_string), None);

        let config = PackageConfig {
            component: Some("ui".into()),
            package_name: Some("@acme/web".into()),
            ..Default::default()
        };
        assert_eq!(
            release_component(&config, Some("web"), str::to_string),
            Some("ui".to_string())
        );

        let config = PackageConfig {
            include_component_in_tag: false,
            ..config
        };
        assert_eq!(release_component(&config, Some("web"), str::to_string), None);
    }

    #[test]
    fn dependency_candidate_is_titled_like_a_release() {
        let candidate = candidate("web");

        assert_eq!(
            candidate.pull_request.title.to_string(),
            "chore(main): release web 1.0.0"
        );
        assert_eq!(
            candidate.pull_request.head_ref_name,
            "releasaurus--branches--main--components--web"
        );
        assert_eq!(
            candidate.pull_request.body.releases[0].component.as_deref(),
            Some("web")
        );
    }
}
