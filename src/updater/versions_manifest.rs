use log::*;

use crate::{
    result::Result,
    updater::Updater,
    version::{Version, VersionsMap},
};

/// Maintains a `versions.txt` manifest of `name:released:current` lines.
#[derive(Debug, Clone)]
pub struct VersionsManifest {
    versions: VersionsMap,
    is_snapshot: bool,
}

impl VersionsManifest {
    pub fn new(versions: VersionsMap, is_snapshot: bool) -> Self {
        Self {
            versions,
            is_snapshot,
        }
    }

    /// Reads the `current` column of every entry. Blank lines and `#`
    /// comments are ignored, as are lines that do not parse.
    pub fn parse_versions(content: &str) -> VersionsMap {
        let mut versions = VersionsMap::new();

        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split(':').collect();
            let [name, _released, current] = parts.as_slice() else {
                warn!("skipping malformed versions manifest line: {line}");
                continue;
            };

            match Version::parse(current) {
                Ok(version) => {
                    versions.insert(name.to_string(), version);
                }
                Err(err) => warn!("skipping {name}: {err}"),
            }
        }

        versions
    }

    /// True when no artifact is currently on a SNAPSHOT version, meaning a
    /// release just happened and the next development cycle has not begun.
    pub fn needs_snapshot(content: &str) -> bool {
        !Self::parse_versions(content)
            .values()
            .any(Version::is_snapshot)
    }
}

impl Updater for VersionsManifest {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let content = content.unwrap_or_default();

        let lines: Vec<String> = content
            .split('\n')
            .map(|line| {
                let parts: Vec<&str> = line.split(':').collect();
                let [name, released, _current] = parts.as_slice() else {
                    return line.to_string();
                };

                match self.versions.get(*name) {
                    Some(version) if self.is_snapshot => {
                        format!("{name}:{released}:{version}")
                    }
                    Some(version) => format!("{name}:{version}:{version}"),
                    None => line.to_string(),
                }
            })
            .collect();

        Ok(lines.join("\n"))
    }
}
