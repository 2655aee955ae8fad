//! Releases: the prior state a strategy starts from and the tagged release
//! built back out of a merged pull request.
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, sync::LazyLock};

use crate::version::Version;

/// Separator between component and version in tags.
pub const DEFAULT_TAG_SEPARATOR: &str = "-";

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<component>.+?)(?P<separator>[-/]))?(?P<v>v)?(?P<version>\d+\.\d+\.\d+.*)$",
    )
    .unwrap()
});

/// A git tag naming a release: `[component<sep>][v]version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagName {
    pub component: Option<String>,
    pub version: Version,
    pub separator: String,
    pub include_v: bool,
}

impl TagName {
    pub fn new(
        version: Version,
        component: Option<String>,
        separator: &str,
        include_v: bool,
    ) -> Self {
        Self {
            component: component.filter(|c| !c.is_empty()),
            version,
            separator: separator.into(),
            include_v,
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        let captures = TAG_REGEX.captures(tag)?;
        let version = Version::parse(&captures["version"]).ok()?;

        Some(Self {
            component: captures.name("component").map(|m| m.as_str().into()),
            version,
            separator: captures
                .name("separator")
                .map(|m| m.as_str())
                .unwrap_or(DEFAULT_TAG_SEPARATOR)
                .into(),
            include_v: captures.name("v").is_some(),
        })
    }
}

impl Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let v = if self.include_v { "v" } else { "" };
        match &self.component {
            Some(component) => {
                write!(f, "{component}{}{v}{}", self.separator, self.version)
            }
            None => write!(f, "{v}{}", self.version),
        }
    }
}

/// The latest release of a package, if there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub tag: TagName,
    pub sha: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A release ready to be tagged and published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRelease {
    pub name: String,
    pub tag: TagName,
    pub notes: String,
    pub sha: String,
    pub path: String,
    pub draft: bool,
    pub prerelease: bool,
}
