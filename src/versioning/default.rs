use log::*;

use crate::{
    commit::ConventionalCommit,
    result::Result,
    version::Version,
    versioning::{VersionUpdate, VersioningOptions, VersioningStrategy},
};

/// Conventional commit driven versioning: breaking changes bump major,
/// features bump minor, anything else bumps patch.
#[derive(Debug, Clone, Default)]
pub struct DefaultVersioningStrategy {
    options: VersioningOptions,
}

/// Breaking and feature commit counts. Breaking commits are not counted as
/// features.
pub(crate) fn count_changes(commits: &[ConventionalCommit]) -> (usize, usize) {
    commits.iter().fold((0, 0), |(breaking, features), commit| {
        if commit.breaking {
            (breaking + 1, features)
        } else if commit.is_feature() {
            (breaking, features + 1)
        } else {
            (breaking, features)
        }
    })
}

/// Returns the forced version when a commit carries a `RELEASE AS` note.
/// The first one found wins; commits are expected newest first.
pub(crate) fn release_as_update(
    commits: &[ConventionalCommit],
) -> Result<Option<VersionUpdate>> {
    match crate::commit::find_release_as(commits) {
        Some(literal) => {
            debug!("found Release-As: {literal}, forcing version");
            Ok(Some(VersionUpdate::Custom(Version::parse_tag(literal)?)))
        }
        None => Ok(None),
    }
}

impl DefaultVersioningStrategy {
    pub fn new(options: VersioningOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &VersioningOptions {
        &self.options
    }
}

impl VersioningStrategy for DefaultVersioningStrategy {
    fn determine_release_type(
        &self,
        version: &Version,
        commits: &[ConventionalCommit],
    ) -> Result<VersionUpdate> {
        if let Some(update) = release_as_update(commits)? {
            return Ok(update);
        }

        let (breaking, features) = count_changes(commits);

        if breaking > 0 {
            if version.is_pre_major() && self.options.bump_minor_pre_major {
                return Ok(VersionUpdate::Minor);
            }
            return Ok(VersionUpdate::Major);
        }

        if features > 0 {
            if version.is_pre_major()
                && self.options.bump_patch_for_minor_pre_major
            {
                return Ok(VersionUpdate::Patch);
            }
            return Ok(VersionUpdate::Minor);
        }

        Ok(VersionUpdate::Patch)
    }
}
