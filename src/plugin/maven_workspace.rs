//! Maven multi-module workspaces.
use async_trait::async_trait;
use log::*;

use crate::{
    commit::ConventionalCommit,
    config::{PackageConfig, ReleaseType},
    error::PlannerError,
    path_helpers::{add_path, is_within, parent_dir},
    plugin::{
        PluginContext, WORKSPACE_DEPENDENCIES_NOTE,
        graph::DependencyGraph,
        workspace::{
            AllPackages, CandidateIndex, WorkspaceAdapter, add_dependency_notes,
            chain_update, dependency_candidate, dependency_changelog_entry,
            release_component,
        },
    },
    pull_request::CandidateReleasePullRequest,
    result::Result,
    updater::{
        Update,
        changelog::Changelog,
        pom_xml::{PomDocument, PomXml},
    },
    version::{Version, VersionsMap},
    versioning::{
        AlwaysBumpPatchStrategy, JavaSnapshotStrategy, VersioningStrategy,
    },
};

const POM_XML: &str = "pom.xml";

/// A parsed `pom.xml` with complete coordinates.
#[derive(Debug, Clone)]
pub struct MavenArtifact {
    /// `groupId:artifactId`
    pub name: String,
    /// Directory holding the `pom.xml`.
    pub path: String,
    pub version: Version,
    document: PomDocument,
}

impl MavenArtifact {
    /// `None`, with a warning, when coordinates are missing or the version
    /// does not parse.
    pub fn parse(content: &str, pom_path: &str) -> Option<Self> {
        let document = match PomDocument::parse(content) {
            Ok(document) => document,
            Err(err) => {
                warn!("failed to parse {pom_path}: {err}");
                return None;
            }
        };

        if document.group_id.is_none() {
            warn!("missing project.groupId in {pom_path}");
            return None;
        }
        if document.artifact_id.is_none() {
            warn!("missing project.artifactId in {pom_path}");
            return None;
        }
        let Some(raw_version) = document.version.as_deref() else {
            warn!("missing project.version in {pom_path}");
            return None;
        };
        let version = match Version::parse(raw_version) {
            Ok(version) => version,
            Err(err) => {
                warn!("unsupported project.version in {pom_path}: {err}");
                return None;
            }
        };

        Some(Self {
            name: document.name()?,
            path: parent_dir(pom_path),
            version,
            document,
        })
    }

    /// Dependency notes for this artifact, empty when nothing changed.
    pub fn dependency_notes(&self, versions: &VersionsMap) -> String {
        let lines: Vec<String> = self
            .document
            .dependency_updates(versions)
            .into_iter()
            .map(|(name, version)| {
                info!("{}: bumped {name} to {version}", self.name);
                format!("\n    * {name} bumped to {version}")
            })
            .collect();

        if lines.is_empty() {
            return String::new();
        }
        format!("{WORKSPACE_DEPENDENCIES_NOTE}{}", lines.join(""))
    }
}

/// Discovers artifacts from every `pom.xml` in the repository.
pub struct MavenWorkspace {
    ctx: PluginContext,
    consider_all_artifacts: bool,
}

impl MavenWorkspace {
    pub fn new(ctx: PluginContext, consider_all_artifacts: bool) -> Self {
        Self {
            ctx,
            consider_all_artifacts,
        }
    }

    fn version_of<'a>(
        versions: &'a VersionsMap,
        artifact: &MavenArtifact,
    ) -> Result<&'a Version> {
        versions
            .get(&artifact.name)
            .ok_or_else(|| PlannerError::UnknownComponent(artifact.name.clone()))
    }
}

#[async_trait]
impl WorkspaceAdapter for MavenWorkspace {
    type Package = MavenArtifact;

    fn name(&self) -> &'static str {
        "maven-workspace"
    }

    fn in_scope(&self, candidate: &CandidateReleasePullRequest) -> bool {
        candidate.config.release_type.is_java()
    }

    fn package_name<'a>(&self, package: &'a MavenArtifact) -> &'a str {
        &package.name
    }

    fn package_path<'a>(&self, package: &'a MavenArtifact) -> &'a str {
        &package.path
    }

    fn dependency_names(&self, package: &MavenArtifact) -> Vec<String> {
        package
            .document
            .dependencies
            .iter()
            .chain(package.document.managed_dependencies.iter())
            .filter(|dep| dep.version.is_some())
            .filter_map(|dep| dep.name())
            .collect()
    }

    async fn build_all_packages(
        &self,
        candidates: &[CandidateReleasePullRequest],
    ) -> Result<AllPackages<MavenArtifact>> {
        let mut packages = vec![];
        let mut index = CandidateIndex::new(candidates);

        let pom_files = self
            .ctx
            .repository
            .find_files_by_filename_and_ref(
                POM_XML.into(),
                self.ctx.target_branch.clone(),
                None,
            )
            .await?;

        for pom_file in pom_files {
            let path = parent_dir(&pom_file);
            if !self.ctx.packages.contains_key(&path) {
                if !self.consider_all_artifacts {
                    info!("path {path} not configured, ignoring {pom_file}");
                    continue;
                }
                debug!("path {path} not configured, considering {pom_file}");
            }

            let contents = self
                .ctx
                .repository
                .get_file_contents_on_branch(
                    pom_file.clone(),
                    self.ctx.target_branch.clone(),
                )
                .await?;
            let Some(artifact) =
                MavenArtifact::parse(&contents.parsed_content, &pom_file)
            else {
                continue;
            };

            match candidates.iter().position(|c| c.path == path) {
                Some(idx) => index.insert(artifact.name.clone(), idx),
                None => debug!("no candidate for {pom_file} at {path}"),
            }
            packages.push(artifact);
        }

        Ok(AllPackages { packages, index })
    }

    fn package_names_to_update(
        &self,
        graph: &DependencyGraph<&MavenArtifact>,
        index: &CandidateIndex,
    ) -> Vec<String> {
        if !self.consider_all_artifacts {
            return index.names();
        }

        let candidate_paths = index.paths();
        graph
            .iter()
            .filter(|(_, node)| {
                candidate_paths
                    .iter()
                    .any(|path| is_within(&node.value.path, path))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn find_candidate(
        &self,
        package: &MavenArtifact,
        index: &CandidateIndex,
    ) -> Option<usize> {
        index
            .get(&package.name)
            .or_else(|| index.nearest(&package.path))
    }

    /// Runs the candidates' own `pom.xml` updates and reads the resulting
    /// artifact versions back.
    async fn seed_versions(
        &self,
        candidates: &[CandidateReleasePullRequest],
        index: &CandidateIndex,
    ) -> Result<VersionsMap> {
        let mut versions = VersionsMap::new();

        for idx in index.indexes() {
            let updates = candidates[idx]
                .pull_request
                .updates
                .iter()
                .filter(|update| update.path.ends_with(POM_XML));

            for update in updates {
                let content = match update
                    .apply(self.ctx.repository.as_ref(), &self.ctx.target_branch)
                    .await
                {
                    Ok(Some(content)) => content,
                    Ok(None) => continue,
                    Err(err) => {
                        warn!("failed to pre-run update of {}: {err}", update.path);
                        continue;
                    }
                };

                if let Some(artifact) = MavenArtifact::parse(&content, &update.path)
                {
                    debug!("{} updated to {}", artifact.name, artifact.version);
                    versions.insert(artifact.name, artifact.version);
                }
            }
        }

        Ok(versions)
    }

    fn bump_version(&self, package: &MavenArtifact) -> Result<Version> {
        JavaSnapshotStrategy::new(Box::new(AlwaysBumpPatchStrategy))
            .bump(&package.version, &[ConventionalCommit::fake_fix()])
    }

    fn is_release_version(&self, version: &Version) -> bool {
        !version.is_snapshot()
    }

    fn update_candidate(
        &self,
        mut candidate: CandidateReleasePullRequest,
        package: &MavenArtifact,
        versions: &VersionsMap,
    ) -> Result<CandidateReleasePullRequest> {
        let version = Self::version_of(versions, package)?;
        let notes = package.dependency_notes(versions);
        let pom_path = add_path(&candidate.path, POM_XML)?;

        chain_update(
            &mut candidate.pull_request.updates,
            &pom_path,
            PomXml::with_dependencies(version.clone(), versions.clone()),
        );
        add_dependency_notes(&mut candidate, &notes);

        Ok(candidate)
    }

    fn new_candidate(
        &self,
        package: &MavenArtifact,
        versions: &VersionsMap,
    ) -> Result<CandidateReleasePullRequest> {
        let version = Self::version_of(versions, package)?.clone();
        let notes = package.dependency_notes(versions);
        let config = self
            .ctx
            .packages
            .get(&package.path)
            .cloned()
            .unwrap_or_else(|| PackageConfig {
                release_type: ReleaseType::Maven,
                ..Default::default()
            });

        let entry = dependency_changelog_entry(&version, &notes);
        let component = release_component(&config, None, str::to_string);

        let updates = vec![
            Update::new(
                add_path(&package.path, POM_XML)?,
                PomXml::with_dependencies(version.clone(), versions.clone()),
            ),
            Update::creating(
                add_path(&package.path, &config.changelog_path)?,
                Changelog::new(version.clone(), entry.clone()),
            ),
        ];

        Ok(dependency_candidate(
            &self.ctx,
            &package.path,
            component,
            version,
            entry,
            updates,
            config,
        ))
    }
}
