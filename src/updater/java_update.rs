//! `{x-version-update:<name>:current|released}` markers used by Java
//! projects to pin versions of artifacts listed in a versions manifest.
use regex::Regex;
use std::sync::LazyLock;

use crate::{result::Result, updater::Updater, version::VersionsMap};

static INLINE_UPDATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{x-version-update:([\w\-]+):(current|released)\}").unwrap()
});

static BLOCK_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{x-version-update-start:([\w\-]+):(current|released)\}")
        .unwrap()
});

static BLOCK_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{x-version-update-end\}").unwrap());

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\.\d+\.\d+(-\w+(\.\d+)?)?(-SNAPSHOT)?").unwrap()
});

/// Rewrites annotated lines from a [`VersionsMap`]. Snapshot runs only
/// touch `current` markers.
#[derive(Debug, Clone)]
pub struct JavaUpdate {
    versions: VersionsMap,
    is_snapshot: bool,
}

impl JavaUpdate {
    pub fn new(versions: VersionsMap, is_snapshot: bool) -> Self {
        Self {
            versions,
            is_snapshot,
        }
    }

    fn applies(&self, kind: &str) -> bool {
        !self.is_snapshot || kind == "current"
    }

    fn replace(&self, line: &str, name: &str) -> String {
        match self.versions.get(name) {
            Some(version) => VERSION
                .replace(line, regex::NoExpand(&version.to_string()))
                .to_string(),
            None => line.to_string(),
        }
    }
}

impl Updater for JavaUpdate {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let content = content.unwrap_or_default();
        if self.versions.is_empty() {
            return Ok(content.to_string());
        }

        let mut lines = vec![];
        let mut block_name: Option<String> = None;

        for line in content.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);

            if let Some(captures) = INLINE_UPDATE.captures(line)
                && self.applies(&captures[2])
            {
                lines.push(self.replace(line, &captures[1]));
            } else if let Some(name) = block_name.as_deref() {
                lines.push(self.replace(line, name));
                if BLOCK_END.is_match(line) {
                    block_name = None;
                }
            } else {
                if let Some(captures) = BLOCK_START.captures(line)
                    && self.applies(&captures[2])
                {
                    block_name = Some(captures[1].to_string());
                }
                lines.push(line.to_string());
            }
        }

        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Version;

    fn versions() -> VersionsMap {
        VersionsMap::from([
            ("google-cloud-foo".to_string(), Version::parse("1.2.4").unwrap()),
            (
                "google-cloud-bar".to_string(),
                Version::parse("2.0.1-SNAPSHOT").unwrap(),
            ),
        ])
    }

    #[test]
    fn test_inline_and_block_markers() {
        let content = "\
<version>1.2.3</version><!-- {x-version-update:google-cloud-foo:current} -->
// {x-version-update-start:google-cloud-bar:released}
compile 'com.google:bar:2.0.0'
// {x-version-update-end}
<version>0.0.1</version><!-- {x-version-update:unknown:current} -->";

        let updated = JavaUpdate::new(versions(), false)
            .update_content(Some(content))
            .unwrap();

        assert_eq!(
            updated,
            "\
<version>1.2.4</version><!-- {x-version-update:google-cloud-foo:current} -->
// {x-version-update-start:google-cloud-bar:released}
compile 'com.google:bar:2.0.1-SNAPSHOT'
// {x-version-update-end}
<version>0.0.1</version><!-- {x-version-update:unknown:current} -->"
        );
    }

    #[test]
    fn test_snapshot_skips_released_markers() {
        let content = "\
a 1.2.3 {x-version-update:google-cloud-foo:released}
b 1.2.3 {x-version-update:google-cloud-foo:current}";

        let updated = JavaUpdate::new(versions(), true)
            .update_content(Some(content))
            .unwrap();

        assert_eq!(
            updated,
            "\
a 1.2.3 {x-version-update:google-cloud-foo:released}
b 1.2.4 {x-version-update:google-cloud-foo:current}"
        );
    }
}
