//! Versioning strategies decide how the current version moves for a set of
//! commits. Each strategy only *decides* (returning a [`VersionUpdate`]);
//! applying the decision is a pure function of the current version.
use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

use crate::{commit::ConventionalCommit, result::Result, version::Version};

mod always_bump;
mod default;
mod dependency_manifest;
mod java_snapshot;
mod prerelease;
mod registry;
mod service_pack;
mod update;

pub use always_bump::{
    AlwaysBumpMajorStrategy, AlwaysBumpMinorStrategy, AlwaysBumpPatchStrategy,
};
pub use default::DefaultVersioningStrategy;
pub use dependency_manifest::DependencyManifestStrategy;
pub use java_snapshot::{JavaAddSnapshotStrategy, JavaSnapshotStrategy};
pub use prerelease::PrereleaseVersioningStrategy;
pub use registry::{VersioningConstructor, VersioningRegistry};
pub use service_pack::ServicePackStrategy;
pub use update::VersionUpdate;

/// Decides the next version for a package.
pub trait VersioningStrategy: Debug + Send + Sync {
    /// Inspects commits and the current version and returns the update to
    /// apply. Side-effect free.
    fn determine_release_type(
        &self,
        version: &Version,
        commits: &[ConventionalCommit],
    ) -> Result<VersionUpdate>;

    /// Applies [`VersioningStrategy::determine_release_type`] to `version`.
    fn bump(
        &self,
        version: &Version,
        commits: &[ConventionalCommit],
    ) -> Result<Version> {
        Ok(self.determine_release_type(version, commits)?.bump(version))
    }
}

/// Options shared by the commit driven strategies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
#[builder(default, setter(into))]
pub struct VersioningOptions {
    /// Breaking changes only bump minor while major is 0.
    pub bump_minor_pre_major: bool,
    /// Features only bump patch while major is 0.
    pub bump_patch_for_minor_pre_major: bool,
    /// Pre-release label used by the prerelease strategy.
    pub prerelease_type: Option<String>,
}

/// Built-in versioning strategies.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum VersioningStrategyType {
    #[default]
    Default,
    AlwaysBumpPatch,
    AlwaysBumpMinor,
    AlwaysBumpMajor,
    ServicePack,
    Prerelease,
    DependencyManifest,
}

impl VersioningStrategyType {
    pub const ALL: [VersioningStrategyType; 7] = [
        VersioningStrategyType::Default,
        VersioningStrategyType::AlwaysBumpPatch,
        VersioningStrategyType::AlwaysBumpMinor,
        VersioningStrategyType::AlwaysBumpMajor,
        VersioningStrategyType::ServicePack,
        VersioningStrategyType::Prerelease,
        VersioningStrategyType::DependencyManifest,
    ];

    /// Builds the strategy for this variant.
    pub fn build(
        &self,
        options: &VersioningOptions,
    ) -> Box<dyn VersioningStrategy> {
        match self {
            VersioningStrategyType::Default => {
                Box::new(DefaultVersioningStrategy::new(options.clone()))
            }
            VersioningStrategyType::AlwaysBumpPatch => {
                Box::new(AlwaysBumpPatchStrategy)
            }
            VersioningStrategyType::AlwaysBumpMinor => {
                Box::new(AlwaysBumpMinorStrategy)
            }
            VersioningStrategyType::AlwaysBumpMajor => {
                Box::new(AlwaysBumpMajorStrategy)
            }
            VersioningStrategyType::ServicePack => Box::new(ServicePackStrategy),
            VersioningStrategyType::Prerelease => {
                Box::new(PrereleaseVersioningStrategy::new(options.clone()))
            }
            VersioningStrategyType::DependencyManifest => {
                Box::new(DependencyManifestStrategy::new(options.clone()))
            }
        }
    }
}

impl Display for VersioningStrategyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersioningStrategyType::Default => f.write_str("default"),
            VersioningStrategyType::AlwaysBumpPatch => {
                f.write_str("always-bump-patch")
            }
            VersioningStrategyType::AlwaysBumpMinor => {
                f.write_str("always-bump-minor")
            }
            VersioningStrategyType::AlwaysBumpMajor => {
                f.write_str("always-bump-major")
            }
            VersioningStrategyType::ServicePack => f.write_str("service-pack"),
            VersioningStrategyType::Prerelease => f.write_str("prerelease"),
            VersioningStrategyType::DependencyManifest => {
                f.write_str("dependency-manifest")
            }
        }
    }
}
