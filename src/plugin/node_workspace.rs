//! npm workspaces made of configured Node packages.
use async_trait::async_trait;
use log::*;
use serde_json::Value;

use crate::{
    error::PlannerError,
    path_helpers::add_path,
    plugin::{
        PluginContext, WORKSPACE_DEPENDENCIES_NOTE,
        workspace::{
            AllPackages, CandidateIndex, WorkspaceAdapter, add_dependency_notes,
            chain_update, dependency_candidate, dependency_changelog_entry,
            release_component,
        },
    },
    pull_request::CandidateReleasePullRequest,
    repository::FileContents,
    result::Result,
    strategy::node::normalize_package_name,
    updater::{
        Update,
        changelog::Changelog,
        package_json::{
            DEPENDENCY_TYPES, PackageJson, is_workspace_protocol, updated_range,
        },
    },
    version::{Version, VersionsMap},
    versioning::{AlwaysBumpPatchStrategy, VersioningStrategy},
};

const PACKAGE_JSON: &str = "package.json";

/// A configured package and its parsed `package.json`.
#[derive(Debug, Clone)]
pub struct NodePackage {
    pub name: String,
    pub path: String,
    pub version: Version,
    manifest: Value,
    contents: FileContents,
}

impl NodePackage {
    /// `None`, with a warning, when the manifest has no name or version.
    pub fn parse(contents: FileContents, path: &str) -> Option<Self> {
        let manifest: Value = match serde_json::from_str(&contents.parsed_content)
        {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!("failed to parse package.json in {path}: {err}");
                return None;
            }
        };

        let Some(name) = manifest.get("name").and_then(Value::as_str) else {
            warn!("missing name in {path}/package.json");
            return None;
        };
        let version = match manifest
            .get("version")
            .and_then(Value::as_str)
            .map(Version::parse)
        {
            Some(Ok(version)) => version,
            _ => {
                warn!("missing or invalid version in {path}/package.json");
                return None;
            }
        };

        Some(Self {
            name: name.to_string(),
            path: path.to_string(),
            version,
            manifest,
            contents,
        })
    }

    /// `(name, specifier)` pairs of one dependency section.
    fn dependencies(&self, dep_type: &str) -> Vec<(&str, &str)> {
        self.manifest
            .get(dep_type)
            .and_then(Value::as_object)
            .map(|section| {
                section
                    .iter()
                    .filter_map(|(name, spec)| {
                        spec.as_str().map(|spec| (name.as_str(), spec))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Dependency notes grouped by section, empty when nothing changed.
    pub fn dependency_notes(&self, versions: &VersionsMap) -> String {
        let mut notes = String::new();

        for dep_type in DEPENDENCY_TYPES {
            let mut lines = String::new();
            for (name, spec) in self.dependencies(dep_type) {
                let Some(version) = versions.get(name) else {
                    continue;
                };

                let new_spec = if is_workspace_protocol(spec) {
                    version.to_string()
                } else {
                    match updated_range(spec, version) {
                        Some(range) if range != spec => range,
                        _ => continue,
                    }
                };
                lines.push_str(&format!(
                    "\n    * {name} bumped from {spec} to {new_spec}"
                ));
            }

            if !lines.is_empty() {
                notes.push_str(&format!("\n  * {dep_type}{lines}"));
            }
        }

        if notes.is_empty() {
            return notes;
        }
        format!("{WORKSPACE_DEPENDENCIES_NOTE}{notes}")
    }
}

/// Discovers packages from the configured Node and Expo package paths.
pub struct NodeWorkspace {
    ctx: PluginContext,
}

impl NodeWorkspace {
    pub fn new(ctx: PluginContext) -> Self {
        Self { ctx }
    }

    fn version_of<'a>(
        versions: &'a VersionsMap,
        package: &NodePackage,
    ) -> Result<&'a Version> {
        versions
            .get(&package.name)
            .ok_or_else(|| PlannerError::UnknownComponent(package.name.clone()))
    }
}

#[async_trait]
impl WorkspaceAdapter for NodeWorkspace {
    type Package = NodePackage;

    fn name(&self) -> &'static str {
        "node-workspace"
    }

    fn in_scope(&self, candidate: &CandidateReleasePullRequest) -> bool {
        candidate.config.release_type.is_node()
    }

    fn package_name<'a>(&self, package: &'a NodePackage) -> &'a str {
        &package.name
    }

    fn package_path<'a>(&self, package: &'a NodePackage) -> &'a str {
        &package.path
    }

    fn dependency_names(&self, package: &NodePackage) -> Vec<String> {
        DEPENDENCY_TYPES
            .iter()
            .flat_map(|dep_type| package.dependencies(dep_type))
            .map(|(name, _)| name.to_string())
            .collect()
    }

    async fn build_all_packages(
        &self,
        candidates: &[CandidateReleasePullRequest],
    ) -> Result<AllPackages<NodePackage>> {
        let mut packages = vec![];
        let mut index = CandidateIndex::new(candidates);

        for (path, config) in &self.ctx.packages {
            if !config.release_type.is_node() {
                continue;
            }

            let manifest_path = add_path(path, PACKAGE_JSON)?;
            let contents = match self
                .ctx
                .repository
                .get_file_contents_on_branch(
                    manifest_path.clone(),
                    self.ctx.target_branch.clone(),
                )
                .await
            {
                Ok(contents) => contents,
                Err(err) if err.is_not_found() => {
                    warn!("{manifest_path} not found, skipping package");
                    continue;
                }
                Err(err) => return Err(err),
            };

            let Some(package) = NodePackage::parse(contents, path) else {
                continue;
            };

            if let Some(idx) = candidates.iter().position(|c| &c.path == path) {
                index.insert(package.name.clone(), idx);
            }
            packages.push(package);
        }

        Ok(AllPackages { packages, index })
    }

    fn bump_version(&self, package: &NodePackage) -> Result<Version> {
        AlwaysBumpPatchStrategy.bump(&package.version, &[])
    }

    fn update_candidate(
        &self,
        mut candidate: CandidateReleasePullRequest,
        package: &NodePackage,
        versions: &VersionsMap,
    ) -> Result<CandidateReleasePullRequest> {
        let version = Self::version_of(versions, package)?;
        let notes = package.dependency_notes(versions);
        let manifest_path = add_path(&candidate.path, PACKAGE_JSON)?;

        chain_update(
            &mut candidate.pull_request.updates,
            &manifest_path,
            PackageJson::with_dependencies(version.clone(), versions.clone()),
        );
        add_dependency_notes(&mut candidate, &notes);

        Ok(candidate)
    }

    fn new_candidate(
        &self,
        package: &NodePackage,
        versions: &VersionsMap,
    ) -> Result<CandidateReleasePullRequest> {
        let version = Self::version_of(versions, package)?.clone();
        let notes = package.dependency_notes(versions);
        let config = self
            .ctx
            .packages
            .get(&package.path)
            .cloned()
            .unwrap_or_default();

        let entry = dependency_changelog_entry(&version, &notes);
        let component = release_component(
            &config,
            Some(&package.name),
            normalize_package_name,
        );

        let updates = vec![
            Update::new(
                add_path(&package.path, PACKAGE_JSON)?,
                PackageJson::with_dependencies(version.clone(), versions.clone()),
            )
            .with_cached_contents(package.contents.clone()),
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

#[cfg(test)]
mod tests {
    use super::*;

    fn package(manifest: &str) -> NodePackage {
        NodePackage::parse(FileContents::new(manifest), "packages/web").unwrap()
    }

    #[test]
    fn requires_name_and_version() {
        let missing_name = FileContents::new(r#"{"version": "1.0.0"}"#);
        assert!(NodePackage::parse(missing_name, "a").is_none());

        let missing_version = FileContents::new(r#"{"name": "a"}"#);
        assert!(NodePackage::parse(missing_version, "a").is_none());
    }

    #[test]
    fn notes_group_changed_ranges_by_section() {
        let web = package(
            r#"{
                "name": "@acme/web",
                "version": "1.0.0",
                "dependencies": {"@acme/core": "^1.0.0", "left-pad": "^1.3.0"},
                "devDependencies": {"@acme/test-utils": "workspace:*"},
                "peerDependencies": {"@acme/ui": "^2.0.0"}
            }"#,
        );
        let mut versions = VersionsMap::new();
        versions.insert("@acme/core".into(), Version::new(1, 0, 1));
        versions.insert("@acme/test-utils".into(), Version::new(0, 2, 0));
        versions.insert("@acme/ui".into(), Version::new(2, 0, 0));

        assert_eq!(
            web.dependency_notes(&versions),
            "* The following workspace dependencies were updated\
             \n  * dependencies\
             \n    * @acme/core bumped from ^1.0.0 to ^1.0.1\
             \n  * devDependencies\
             \n    * @acme/test-utils bumped from workspace:* to 0.2.0"
        );
    }

    #[test]
    fn unchanged_dependencies_have_no_notes() {
        let web = package(
            r#"{"name": "web", "version": "1.0.0", "dependencies": {"core": "^1.0.0"}}"#,
        );
        let mut versions = VersionsMap::new();
        versions.insert("core".into(), Version::new(1, 0, 0));

        assert_eq!(web.dependency_notes(&versions), "");
    }
}
