//! Per-ecosystem behaviour plugged into the release assembly in
//! [`crate::strategy::Strategy`].
use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    changelog_notes::{ChangelogSection, default_changelog_sections},
    commit::ConventionalCommit,
    config::ReleaseType,
    release::Release,
    result::Result,
    strategy::{
        StrategyContext, expo::ExpoEcosystem, generic::GenericEcosystem,
        java::JavaEcosystem, node::NodeEcosystem,
    },
    updater::Update,
    version::{Version, VersionsMap},
    versioning::VersioningStrategy,
};

/// Everything an ecosystem needs to describe its file updates.
#[derive(Debug)]
pub struct BuildUpdatesOptions<'a> {
    pub new_version: &'a Version,
    pub versions_map: &'a VersionsMap,
    pub latest_version: Option<&'a Version>,
    pub is_snapshot: bool,
}

/// Hooks overriding the shared release assembly. Every method has a default
/// matching the generic ecosystem except [`Ecosystem::build_updates`].
#[async_trait]
pub trait Ecosystem: Debug + Send + Sync {
    fn changelog_sections(&self) -> Vec<ChangelogSection> {
        default_changelog_sections()
    }

    /// Wraps the configured versioning strategy.
    fn wrap_versioning(
        &self,
        versioning: Box<dyn VersioningStrategy>,
    ) -> Box<dyn VersioningStrategy> {
        versioning
    }

    /// Versioning used for snapshot bump pull requests. `None` when the
    /// ecosystem never produces them.
    fn snapshot_versioning(
        &self,
        _versioning: Box<dyn VersioningStrategy>,
    ) -> Option<Box<dyn VersioningStrategy>> {
        None
    }

    fn initial_version(&self) -> Version {
        Version::new(1, 0, 0)
    }

    fn post_process_commits(
        &self,
        commits: Vec<ConventionalCommit>,
    ) -> Vec<ConventionalCommit> {
        commits
    }

    fn normalize_component(&self, component: &str) -> String {
        component.to_string()
    }

    /// False for versions that must not be tagged (e.g. SNAPSHOT builds).
    fn is_valid_release(&self, _version: &Version) -> bool {
        true
    }

    /// Package name read from the ecosystem's manifest.
    async fn default_package_name(
        &self,
        _ctx: &StrategyContext,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    /// Sub-artifact versions tracked alongside the package version.
    async fn build_versions_map(
        &self,
        _ctx: &StrategyContext,
    ) -> Result<VersionsMap> {
        Ok(VersionsMap::new())
    }

    /// Adjusts the bumped versions map once the package version is known.
    fn finalize_versions_map(
        &self,
        _ctx: &StrategyContext,
        _versions: &mut VersionsMap,
        _component: &str,
        _version: &Version,
    ) {
    }

    /// True when a snapshot bump should replace the regular release.
    async fn needs_snapshot(
        &self,
        _ctx: &StrategyContext,
        _commits: &[ConventionalCommit],
        _latest_release: Option<&Release>,
    ) -> Result<bool> {
        Ok(false)
    }

    /// Manifest updates for the new version. The changelog and typed extra
    /// files are added by the strategy itself.
    async fn build_updates(
        &self,
        ctx: &StrategyContext,
        options: &BuildUpdatesOptions<'_>,
    ) -> Result<Vec<Update>>;
}

/// Returns the ecosystem handling `release_type`.
pub fn ecosystem_for(release_type: ReleaseType) -> Box<dyn Ecosystem> {
    match release_type {
        ReleaseType::Generic => Box::new(GenericEcosystem),
        ReleaseType::Node => Box::new(NodeEcosystem::default()),
        ReleaseType::Expo => Box::new(ExpoEcosystem::default()),
        ReleaseType::Java | ReleaseType::Maven => {
            Box::new(JavaEcosystem::default())
        }
    }
}
