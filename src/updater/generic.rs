//! Marker driven version replacement for arbitrary text files.
//!
//! Lines annotated with `x-release-please-<scope>` are rewritten in place,
//! as is every line between `x-release-please-start-<scope>` and
//! `x-release-please-end`. Supported scopes are `major`, `minor`, `patch`
//! and `version`.
use log::*;
use regex::Regex;
use std::sync::LazyLock;

use crate::{result::Result, updater::Updater, version::Version};

const DEFAULT_PREFIX: &str = "x-release-please-";
const RELEASED_PREFIX: &str = "x-release-please-released-";
const SCOPES: &str = "major|minor|patch|version";

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)\.(\d+)(-[\w.]+)?(\+[-\w.]+)?").unwrap()
});

static SINGLE_VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+\b").unwrap());

/// Replaces versions on annotated lines.
#[derive(Debug, Clone)]
pub struct Generic {
    version: Version,
    inline_regex: Regex,
    block_start_regex: Regex,
    block_end_regex: Regex,
}

impl Generic {
    pub fn new(version: Version) -> Result<Self> {
        Self::with_prefix(version, DEFAULT_PREFIX)
    }

    /// Java flavour updating `x-release-please-released-*` markers, used for
    /// versions that only change on real (non-SNAPSHOT) releases.
    pub fn java_released(version: Version) -> Result<Self> {
        Self::with_prefix(version, RELEASED_PREFIX)
    }

    fn with_prefix(version: Version, prefix: &str) -> Result<Self> {
        let prefix = regex::escape(prefix);
        Ok(Self {
            version,
            inline_regex: Regex::new(&format!("{prefix}({SCOPES})"))?,
            block_start_regex: Regex::new(&format!("{prefix}start-({SCOPES})"))?,
            block_end_regex: Regex::new(&format!("{prefix}end"))?,
        })
    }

    fn replace_version(&self, line: &str, scope: &str) -> String {
        match scope {
            "major" => SINGLE_VERSION_REGEX
                .replace(line, self.version.major.to_string())
                .to_string(),
            "minor" => SINGLE_VERSION_REGEX
                .replace(line, self.version.minor.to_string())
                .to_string(),
            "patch" => SINGLE_VERSION_REGEX
                .replace(line, self.version.patch.to_string())
                .to_string(),
            "version" => VERSION_REGEX
                .replace(line, regex::NoExpand(&self.version.to_string()))
                .to_string(),
            other => {
                warn!("unknown block scope: {other}");
                line.to_string()
            }
        }
    }
}

impl Updater for Generic {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let Some(content) = content.filter(|c| !c.is_empty()) else {
            return Ok(String::new());
        };

        let mut lines = vec![];
        let mut block_scope: Option<String> = None;

        for line in content.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);

            if let Some(captures) = self.inline_regex.captures(line) {
                lines.push(self.replace_version(line, &captures[1]));
            } else if let Some(scope) = block_scope.as_deref() {
                lines.push(self.replace_version(line, scope));
                if self.block_end_regex.is_match(line) {
                    block_scope = None;
                }
            } else {
                lines.push(line.to_string());
                if let Some(captures) = self.block_start_regex.captures(line) {
                    block_scope = Some(captures[1].to_string());
                }
            }
        }

        Ok(lines.join("\n"))
    }
}
