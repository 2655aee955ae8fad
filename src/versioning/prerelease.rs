use crate::{
    commit::ConventionalCommit,
    result::Result,
    version::Version,
    versioning::{
        VersionUpdate, VersioningOptions, VersioningStrategy,
        default::{count_changes, release_as_update},
    },
};

/// Increments a pre-release counter (`1.2.3-beta01 -> 1.2.3-beta02`) while a
/// pre-release is in flight, preserving leading zeros.
#[derive(Debug, Clone, Default)]
pub struct PrereleaseVersioningStrategy {
    options: VersioningOptions,
}

impl PrereleaseVersioningStrategy {
    pub fn new(options: VersioningOptions) -> Self {
        Self { options }
    }
}

impl VersioningStrategy for PrereleaseVersioningStrategy {
    fn determine_release_type(
        &self,
        version: &Version,
        commits: &[ConventionalCommit],
    ) -> Result<VersionUpdate> {
        if let Some(update) = release_as_update(commits)? {
            return Ok(update);
        }

        let prerelease_type = self.options.prerelease_type.clone();
        let (breaking, features) = count_changes(commits);

        if breaking > 0 {
            if version.is_pre_major() && self.options.bump_minor_pre_major {
                return Ok(VersionUpdate::PrereleaseMinor { prerelease_type });
            }
            return Ok(VersionUpdate::PrereleaseMajor { prerelease_type });
        }

        if features > 0 {
            if version.is_pre_major()
                && self.options.bump_patch_for_minor_pre_major
            {
                return Ok(VersionUpdate::PrereleasePatch { prerelease_type });
            }
            return Ok(VersionUpdate::PrereleaseMinor { prerelease_type });
        }

        Ok(VersionUpdate::PrereleasePatch { prerelease_type })
    }
}
