//! Fixed strategies for maintenance and backport branches.
use crate::{
    commit::ConventionalCommit,
    result::Result,
    version::Version,
    versioning::{VersionUpdate, VersioningStrategy},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysBumpMajorStrategy;

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysBumpMinorStrategy;

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysBumpPatchStrategy;

impl VersioningStrategy for AlwaysBumpMajorStrategy {
    fn determine_release_type(
        &self,
        _version: &Version,
        _commits: &[ConventionalCommit],
    ) -> Result<VersionUpdate> {
        Ok(VersionUpdate::Major)
    }
}

impl VersioningStrategy for AlwaysBumpMinorStrategy {
    fn determine_release_type(
        &self,
        _version: &Version,
        _commits: &[ConventionalCommit],
    ) -> Result<VersionUpdate> {
        Ok(VersionUpdate::Minor)
    }
}

impl VersioningStrategy for AlwaysBumpPatchStrategy {
    fn determine_release_type(
        &self,
        _version: &Version,
        _commits: &[ConventionalCommit],
    ) -> Result<VersionUpdate> {
        Ok(VersionUpdate::Patch)
    }
}
