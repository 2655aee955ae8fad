use log::*;
use regex::Regex;
use std::{collections::BTreeMap, sync::LazyLock};

use crate::{
    commit::ConventionalCommit,
    result::Result,
    version::Version,
    versioning::{
        DefaultVersioningStrategy, VersionUpdate, VersioningOptions,
        VersioningStrategy,
    },
};

static DEPENDENCY_UPDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^deps: update dependency (.*) to (v[^\s]*)(\s\(#\d+\))?$")
        .unwrap()
});

/// Default versioning that also weighs `deps: update dependency <name> to
/// v<version>` commits by the size of the dependency's own version change.
#[derive(Debug, Clone, Default)]
pub struct DependencyManifestStrategy {
    inner: DefaultVersioningStrategy,
}

impl DependencyManifestStrategy {
    pub fn new(options: VersioningOptions) -> Self {
        Self {
            inner: DefaultVersioningStrategy::new(options),
        }
    }
}

/// First dependency update line of each commit. First mentioned version
/// wins for each dependency.
fn dependency_updates(
    commits: &[ConventionalCommit],
) -> BTreeMap<String, Version> {
    let mut updates = BTreeMap::new();

    for commit in commits {
        let Some(captures) = DEPENDENCY_UPDATE.captures(&commit.message) else {
            continue;
        };

        let name = captures[1].to_string();
        if updates.contains_key(&name) {
            continue;
        }

        let raw = captures[2].trim_start_matches('v');
        let parsed = Version::parse(raw)
            .or_else(|_| Version::parse(&format!("{raw}.0.0")));

        match parsed {
            Ok(version) => {
                updates.insert(name, version);
            }
            Err(_) => {
                warn!("unable to parse dependency version: {raw}");
            }
        }
    }

    updates
}

impl VersioningStrategy for DependencyManifestStrategy {
    fn determine_release_type(
        &self,
        version: &Version,
        commits: &[ConventionalCommit],
    ) -> Result<VersionUpdate> {
        let regular = self.inner.determine_release_type(version, commits)?;

        let mut breaking = 0;
        let mut features = 0;
        for (name, dependency) in dependency_updates(commits) {
            if dependency.patch == 0 && dependency.minor == 0 {
                debug!("found breaking dependency update: {name}");
                breaking += 1;
            } else if dependency.patch == 0 {
                debug!("found feature dependency update: {name}");
                features += 1;
            }
        }

        let options = self.inner.options();
        let dependency = if breaking > 0 {
            if version.is_pre_major() && options.bump_minor_pre_major {
                VersionUpdate::Minor
            } else {
                VersionUpdate::Major
            }
        } else if features > 0 {
            if version.is_pre_major() && options.bump_patch_for_minor_pre_major
            {
                VersionUpdate::Patch
            } else {
                VersionUpdate::Minor
            }
        } else {
            VersionUpdate::Patch
        };

        // regular bump wins ties
        if dependency.bump(version) <= regular.bump(version) {
            return Ok(regular);
        }

        Ok(dependency)
    }
}
