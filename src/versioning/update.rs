//! Version update operators: pure `Version -> Version` bump rules.
use regex::Regex;
use std::sync::LazyLock;

use crate::version::Version;

// last run of digits, e.g. beta01-01 -> the trailing 01
static PRERELEASE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(\D*)$").unwrap());

static SERVICE_PACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sp\.(\d+)").unwrap());

/// A decided version change, applied with [`VersionUpdate::bump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionUpdate {
    /// `(M+1).0.0`, keeping pre-release and build untouched.
    Major,
    /// `M.(m+1).0`
    Minor,
    /// `M.m.(p+1)`
    Patch,
    /// Ignores the input and yields the literal version.
    Custom(Version),
    PrereleasePatch { prerelease_type: Option<String> },
    PrereleaseMinor { prerelease_type: Option<String> },
    PrereleaseMajor { prerelease_type: Option<String> },
    /// Increments an `sp.N` counter, starting at `sp.1`.
    ServicePack,
    /// Strips `-SNAPSHOT`, optionally after applying another update.
    RemoveSnapshot(Option<Box<VersionUpdate>>),
    /// Applies the inner update then appends `-SNAPSHOT`.
    AddSnapshot(Box<VersionUpdate>),
}

impl VersionUpdate {
    pub fn bump(&self, version: &Version) -> Version {
        match self {
            VersionUpdate::Major => Version {
                major: version.major + 1,
                minor: 0,
                patch: 0,
                ..version.clone()
            },
            VersionUpdate::Minor => Version {
                minor: version.minor + 1,
                patch: 0,
                ..version.clone()
            },
            VersionUpdate::Patch => Version {
                patch: version.patch + 1,
                ..version.clone()
            },
            VersionUpdate::Custom(custom) => custom.clone(),
            VersionUpdate::PrereleasePatch { prerelease_type } => {
                match version.pre_release.as_deref() {
                    Some(pre) => version
                        .clone()
                        .with_pre_release(Some(bump_prerelease(pre))),
                    None => Version {
                        patch: version.patch + 1,
                        pre_release: prerelease_type.clone(),
                        ..version.clone()
                    },
                }
            }
            VersionUpdate::PrereleaseMinor { prerelease_type } => {
                match version.pre_release.as_deref() {
                    Some(pre) if version.patch == 0 => version
                        .clone()
                        .with_pre_release(Some(bump_prerelease(pre))),
                    Some(_) => VersionUpdate::Minor.bump(version),
                    None => Version {
                        minor: version.minor + 1,
                        patch: 0,
                        pre_release: prerelease_type.clone(),
                        ..version.clone()
                    },
                }
            }
            VersionUpdate::PrereleaseMajor { prerelease_type } => {
                match version.pre_release.as_deref() {
                    Some(pre) if version.patch == 0 && version.minor == 0 => {
                        version
                            .clone()
                            .with_pre_release(Some(bump_prerelease(pre)))
                    }
                    Some(_) => VersionUpdate::Major.bump(version),
                    None => Version {
                        major: version.major + 1,
                        minor: 0,
                        patch: 0,
                        pre_release: prerelease_type.clone(),
                        ..version.clone()
                    },
                }
            }
            VersionUpdate::ServicePack => {
                let pre_release = match version.pre_release.as_deref() {
                    Some(pre) if SERVICE_PACK.is_match(pre) => {
                        bump_service_pack(pre)
                    }
                    _ => "sp.1".to_string(),
                };
                version.clone().with_pre_release(Some(pre_release))
            }
            VersionUpdate::RemoveSnapshot(parent) => {
                let bumped = match parent {
                    Some(parent) => parent.bump(version),
                    None => version.clone(),
                };
                bumped.without_snapshot()
            }
            VersionUpdate::AddSnapshot(inner) => {
                inner.bump(version).with_snapshot()
            }
        }
    }
}

/// Increments the last number in a pre-release, preserving zero padding.
/// `beta01` becomes `beta02`; a pre-release without digits gains `.1`.
fn bump_prerelease(pre_release: &str) -> String {
    let Some(captures) = PRERELEASE_NUMBER.captures(pre_release) else {
        return format!("{pre_release}.1");
    };

    let (Some(number), Some(tail)) = (captures.get(1), captures.get(2)) else {
        return format!("{pre_release}.1");
    };

    let Ok(current) = number.as_str().parse::<u64>() else {
        return format!("{pre_release}.1");
    };

    let width = number.as_str().len();
    format!(
        "{}{:0width$}{}",
        &pre_release[..number.start()],
        current + 1,
        tail.as_str(),
    )
}

fn bump_service_pack(pre_release: &str) -> String {
    SERVICE_PACK
        .replace(pre_release, |caps: &regex::Captures| {
            let next = caps[1].parse::<u64>().map(|n| n + 1).unwrap_or(1);
            format!("sp.{next}")
        })
        .to_string()
}
