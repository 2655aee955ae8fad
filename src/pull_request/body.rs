use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, sync::LazyLock};

use crate::version::Version;

pub const DEFAULT_HEADER: &str =
    ":robot: I have created a release *beep* *boop*";
pub const DEFAULT_FOOTER: &str = "This PR was generated with [Releasaurus](https://github.com/robgonnella/releasaurus).";

static LAYOUT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?P<header>.*?)\n---\n(?P<content>.*)\n---\n(?P<footer>.*)$")
        .unwrap()
});

static DETAILS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<details(?: open)?><summary>(?P<summary>.*?)</summary>(?P<notes>.*?)</details>")
        .unwrap()
});

static HEADING_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#{2,} \[?v?(?P<version>\d+\.\d+\.\d+[^\]\s]*)").unwrap()
});

/// One component's entry in a release pull request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseData {
    pub component: Option<String>,
    pub version: Option<Version>,
    pub notes: String,
}

impl ReleaseData {
    fn summary(&self) -> String {
        let version = self
            .version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();
        match &self.component {
            Some(component) => format!("{component}: {version}"),
            None => version,
        }
    }

    fn from_details(summary: &str, notes: &str) -> Self {
        let summary = summary.trim();
        let (component, version) = match summary.rsplit_once(": ") {
            Some((component, version)) => (Some(component.to_string()), version),
            None => (None, summary),
        };

        Self {
            component,
            version: Version::parse_tag(version).ok(),
            notes: notes.trim().to_string(),
        }
    }
}

/// Body of a release pull request: a header, the release entries and a
/// footer separated by `---` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestBody {
    pub header: String,
    pub footer: String,
    pub releases: Vec<ReleaseData>,
    /// Render entries inside `<details>` blocks even for a single release.
    pub use_components: bool,
}

impl PullRequestBody {
    pub fn new(releases: Vec<ReleaseData>, use_components: bool) -> Self {
        Self {
            header: DEFAULT_HEADER.into(),
            footer: DEFAULT_FOOTER.into(),
            releases,
            use_components,
        }
    }

    pub fn notes(&self) -> String {
        if self.releases.len() == 1 && !self.use_components {
            return self.releases[0].notes.trim().to_string();
        }

        self.releases
            .iter()
            .map(|release| {
                format!(
                    "<details><summary>{}</summary>\n\n{}\n</details>",
                    release.summary(),
                    release.notes.trim()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Recovers the release entries of a rendered body. `None` when the
    /// body does not have the expected layout.
    pub fn parse(body: &str) -> Option<Self> {
        let body = body.replace("\r\n", "\n");
        let captures = LAYOUT_REGEX.captures(&body)?;
        let content = captures["content"].trim();

        let details: Vec<ReleaseData> = DETAILS_REGEX
            .captures_iter(content)
            .map(|cap| ReleaseData::from_details(&cap["summary"], &cap["notes"]))
            .collect();

        let (releases, use_components) = if details.is_empty() {
            let version = HEADING_VERSION_REGEX
                .captures(content)
                .and_then(|cap| Version::parse(&cap["version"]).ok());
            let release = ReleaseData {
                component: None,
                version,
                notes: content.to_string(),
            };
            (vec![release], false)
        } else {
            (details, true)
        };

        Some(Self {
            header: captures["header"].trim().to_string(),
            footer: captures["footer"].trim().to_string(),
            releases,
            use_components,
        })
    }
}

impl Display for PullRequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n---\n\n\n{}\n\n---\n{}",
            self.header,
            self.notes(),
            self.footer
        )
    }
}
