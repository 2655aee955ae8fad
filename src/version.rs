//! Semantic version value type shared by every versioning strategy.
//!
//! Unlike [`semver::Version`], any pre-release text is accepted (e.g.
//! `beta-sp.1-SNAPSHOT` or `beta01`) and survives a parse/format round-trip
//! byte for byte.
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    cmp::Ordering,
    collections::BTreeMap,
    fmt::{self, Display},
    str::FromStr,
    sync::LazyLock,
};

use crate::{error::PlannerError, result::Result};

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-([^+]+))?(?:\+(.+))?$",
    )
    .unwrap()
});

static SNAPSHOT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?SNAPSHOT").unwrap());

/// Maps a component or artifact name to the version it is moving to.
pub type VersionsMap = BTreeMap<String, Version>;

/// Immutable semantic version: `major.minor.patch[-pre_release][+build]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<String>,
    pub build: Option<String>,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
            build: None,
        }
    }

    /// Parses `major.minor.patch` with optional `-pre` and `+build` parts.
    pub fn parse(input: &str) -> Result<Self> {
        let captures = VERSION_REGEX
            .captures(input)
            .ok_or_else(|| PlannerError::version(input))?;

        let number = |idx: usize| -> Result<u64> {
            captures[idx]
                .parse::<u64>()
                .map_err(|_| PlannerError::version(input))
        };

        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            pre_release: captures.get(4).map(|m| m.as_str().to_string()),
            build: captures.get(5).map(|m| m.as_str().to_string()),
        })
    }

    /// Same as [`Version::parse`] but tolerates a leading `v`, as found in
    /// tags and dependency update commit messages.
    pub fn parse_tag(input: &str) -> Result<Self> {
        Self::parse(input.strip_prefix('v').unwrap_or(input))
    }

    pub fn with_pre_release(mut self, pre_release: Option<String>) -> Self {
        self.pre_release = pre_release;
        self
    }

    /// True for `0.x.y` versions.
    pub fn is_pre_major(&self) -> bool {
        self.major < 1
    }

    /// True when the pre-release carries a Maven `SNAPSHOT` qualifier.
    pub fn is_snapshot(&self) -> bool {
        self.pre_release
            .as_deref()
            .is_some_and(|pre| SNAPSHOT_REGEX.is_match(pre))
    }

    /// Removes the first `-SNAPSHOT` qualifier. An emptied pre-release is
    /// dropped entirely.
    pub fn without_snapshot(&self) -> Self {
        let pre_release = self
            .pre_release
            .as_deref()
            .map(|pre| SNAPSHOT_REGEX.replace(pre, "").to_string())
            .filter(|pre| !pre.is_empty());

        self.clone().with_pre_release(pre_release)
    }

    /// Appends `-SNAPSHOT` to any existing pre-release, or sets `SNAPSHOT`.
    pub fn with_snapshot(&self) -> Self {
        let pre_release = match self.pre_release.as_deref() {
            Some(pre) => format!("{pre}-SNAPSHOT"),
            None => "SNAPSHOT".to_string(),
        };

        self.clone().with_pre_release(Some(pre_release))
    }
}

fn compare_pre_release(a: &str, b: &str) -> Ordering {
    match (semver::Prerelease::new(a), semver::Prerelease::new(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| {
                match (self.pre_release.as_deref(), other.pre_release.as_deref())
                {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Greater,
                    (Some(_), None) => Ordering::Less,
                    (Some(a), Some(b)) => compare_pre_release(a, b),
                }
            })
            // build metadata never affects precedence, but keeps the order
            // consistent with equality
            .then_with(|| self.build.cmp(&other.build))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{pre}")?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::parse_tag(&raw).map_err(serde::de::Error::custom)
    }
}
