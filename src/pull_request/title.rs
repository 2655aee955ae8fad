use regex::Regex;
use std::fmt::Display;

use crate::{result::Result, version::Version};

/// Default release pull request title pattern.
pub const DEFAULT_PR_TITLE_PATTERN: &str =
    "chore${scope}: release${component} ${version}";

const SCOPE: &str = "${scope}";
const COMPONENT: &str = "${component}";
const VERSION: &str = "${version}";
const BRANCH: &str = "${branch}";

/// Compiles a title pattern into a regex capturing `branch`, `component`
/// and `version`. The version is optional so merged pull requests that
/// group several components still match.
fn match_pattern(pattern: &str) -> Result<Regex> {
    let mut regex = String::from("^");
    let mut rest = pattern;
    let mut branch_captured = false;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let placeholder = &rest[start..start + len + 1];
        regex.push_str(&regex::escape(&rest[..start]));

        match placeholder {
            SCOPE => {
                let group = if branch_captured { "?:" } else { "?P<branch>" };
                regex.push_str(&format!(r"(?:\(({group}[\w\-./]+)\))?"));
                branch_captured = true;
            }
            BRANCH => {
                let group = if branch_captured { "?:" } else { "?P<branch>" };
                regex.push_str(&format!(r"({group}[\w\-./]+)?"));
                branch_captured = true;
            }
            // lazily optional: a bare version is never read as a component
            COMPONENT => {
                regex.push_str(r"(?: ?(?P<component>@?[\w\-./]+))??");
            }
            VERSION => {
                if regex.ends_with(' ') {
                    regex.pop();
                    regex.push_str(r"(?: v?(?P<version>\d+\.\d+\.\d+\S*))?");
                } else {
                    regex.push_str(r"(?:v?(?P<version>\d+\.\d+\.\d+\S*))?");
                }
            }
            other => regex.push_str(&regex::escape(other)),
        }

        rest = &rest[start + len + 1..];
    }

    regex.push_str(&regex::escape(rest));
    regex.push('$');

    Ok(Regex::new(&regex)?)
}

/// Title of a release pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestTitle {
    pub component: Option<String>,
    pub target_branch: Option<String>,
    pub version: Option<Version>,
    pattern: String,
}

impl PullRequestTitle {
    pub fn new(
        component: Option<String>,
        target_branch: Option<String>,
        version: Option<Version>,
        pattern: Option<&str>,
    ) -> Self {
        Self {
            component: component.filter(|c| !c.is_empty()),
            target_branch,
            version,
            pattern: pattern.unwrap_or(DEFAULT_PR_TITLE_PATTERN).into(),
        }
    }

    /// Parses `title` against `pattern`, returning `None` when it does not
    /// match.
    pub fn parse(title: &str, pattern: Option<&str>) -> Result<Option<Self>> {
        let pattern = pattern.unwrap_or(DEFAULT_PR_TITLE_PATTERN);
        let regex = match_pattern(pattern)?;

        let Some(captures) = regex.captures(title) else {
            return Ok(None);
        };

        let version = match captures.name("version") {
            Some(m) => match Version::parse(m.as_str()) {
                Ok(version) => Some(version),
                Err(_) => return Ok(None),
            },
            None => None,
        };

        Ok(Some(Self::new(
            captures.name("component").map(|m| m.as_str().into()),
            captures.name("branch").map(|m| m.as_str().into()),
            version,
            Some(pattern),
        )))
    }
}

impl Display for PullRequestTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = self
            .target_branch
            .as_ref()
            .map(|branch| format!("({branch})"))
            .unwrap_or_default();
        let component = self
            .component
            .as_ref()
            .map(|component| format!(" {component}"))
            .unwrap_or_default();
        let version = self
            .version
            .as_ref()
            .map(|version| version.to_string())
            .unwrap_or_default();

        let title = self
            .pattern
            .replace(SCOPE, &scope)
            .replace(COMPONENT, &component)
            .replace(VERSION, &version)
            .replace(BRANCH, self.target_branch.as_deref().unwrap_or_default());

        f.write_str(title.trim())
    }
}
