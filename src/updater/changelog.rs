use log::*;
use regex::Regex;
use std::sync::LazyLock;

use crate::{result::Result, updater::Updater, version::Version};

pub const DEFAULT_CHANGELOG_HEADER: &str = "# Changelog";

// previous release entries start with an h2/h3 version heading
static VERSION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n###? v?[0-9\[]").unwrap());

/// Prepends a release entry to a markdown changelog.
#[derive(Debug, Clone)]
pub struct Changelog {
    pub version: Version,
    /// Rendered notes for this release. Workspace plugins append dependency
    /// notes here before the update is applied.
    pub changelog_entry: String,
    pub header: String,
}

impl Changelog {
    pub fn new(version: Version, changelog_entry: impl Into<String>) -> Self {
        Self {
            version,
            changelog_entry: changelog_entry.into(),
            header: DEFAULT_CHANGELOG_HEADER.to_string(),
        }
    }
}

impl Updater for Changelog {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let content = content.unwrap_or_default();

        match VERSION_HEADER.find(content) {
            None => {
                debug!("creating changelog for {}", self.version);
                Ok(format!("{}\n\n{}\n", self.header, self.changelog_entry))
            }
            Some(found) => {
                let (before, after) = content.split_at(found.start());
                let merged =
                    format!("{before}\n{}\n{after}", self.changelog_entry);
                Ok(format!("{}\n", merged.trim()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changelog(entry: &str) -> Changelog {
        Changelog::new(Version::parse("1.1.0").unwrap(), entry)
    }

    #[test]
    fn test_creates_new_changelog() {
        let updated = changelog("## 1.1.0\n\n* new thing")
            .update_content(None)
            .unwrap();
        assert_eq!(updated, "# Changelog\n\n## 1.1.0\n\n* new thing\n");
    }

    #[test]
    fn test_inserts_above_previous_entry() {
        let existing = "# Changelog\n\n## 1.0.0\n\n* first\n";
        let updated = changelog("## 1.1.0\n\n* second")
            .update_content(Some(existing))
            .unwrap();
        assert_eq!(
            updated,
            "# Changelog\n\n## 1.1.0\n\n* second\n\n## 1.0.0\n\n* first\n"
        );
    }

    #[test]
    fn test_handles_linked_headings() {
        let existing = "# Changelog\n\n### [1.0.1](https://x) (2024-01-01)\n";
        let updated = changelog("## [1.1.0](https://y)")
            .update_content(Some(existing))
            .unwrap();
        assert!(updated.starts_with("# Changelog\n\n## [1.1.0]"));
        assert!(updated.ends_with("### [1.0.1](https://x) (2024-01-01)\n"));
    }
}
