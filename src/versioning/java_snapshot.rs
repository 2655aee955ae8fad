//! Maven SNAPSHOT decorators around any other versioning strategy.
use crate::{
    commit::ConventionalCommit,
    result::Result,
    version::Version,
    versioning::{VersionUpdate, VersioningStrategy},
};

/// Releases a `-SNAPSHOT` version. When the real commits would move the
/// version no further than a plain fix would, the snapshot qualifier is just
/// dropped; otherwise the wrapped bump is applied first.
#[derive(Debug)]
pub struct JavaSnapshotStrategy {
    inner: Box<dyn VersioningStrategy>,
}

impl JavaSnapshotStrategy {
    pub fn new(inner: Box<dyn VersioningStrategy>) -> Self {
        Self { inner }
    }
}

impl VersioningStrategy for JavaSnapshotStrategy {
    fn determine_release_type(
        &self,
        version: &Version,
        commits: &[ConventionalCommit],
    ) -> Result<VersionUpdate> {
        let parent = self.inner.determine_release_type(version, commits)?;

        if !version.is_snapshot() || matches!(parent, VersionUpdate::Custom(_)) {
            return Ok(parent);
        }

        let fake = self
            .inner
            .determine_release_type(version, &[ConventionalCommit::fake_fix()])?;

        if fake.bump(version) == parent.bump(version) {
            return Ok(VersionUpdate::RemoveSnapshot(None));
        }

        Ok(VersionUpdate::RemoveSnapshot(Some(Box::new(parent))))
    }
}

/// Moves to the next development version: bumps as a plain fix would, then
/// appends `-SNAPSHOT`.
#[derive(Debug)]
pub struct JavaAddSnapshotStrategy {
    inner: Box<dyn VersioningStrategy>,
}

impl JavaAddSnapshotStrategy {
    pub fn new(inner: Box<dyn VersioningStrategy>) -> Self {
        Self { inner }
    }
}

impl VersioningStrategy for JavaAddSnapshotStrategy {
    fn determine_release_type(
        &self,
        version: &Version,
        _commits: &[ConventionalCommit],
    ) -> Result<VersionUpdate> {
        let inner = self
            .inner
            .determine_release_type(version, &[ConventionalCommit::fake_fix()])?;

        Ok(VersionUpdate::AddSnapshot(Box::new(inner)))
    }
}
