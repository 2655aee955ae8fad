//! Release notes rendered from conventional commits.
use chrono::NaiveDate;
use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{commit::ConventionalCommit, result::Result, version::Version};

/// Default notes template.
pub const DEFAULT_NOTES_TEMPLATE: &str = r#"## {{ heading }}

{% for section in sections %}
### {{ section.title }}

{% for entry in section.entries -%}
* {{ entry }}
{% endfor -%}
{% endfor -%}
"#;

/// Title of the section listing breaking changes.
pub const BREAKING_CHANGES_TITLE: &str = "⚠ BREAKING CHANGES";

const BREAKING_CHANGE_NOTE: &str = "BREAKING CHANGE";

/// Maps a commit type to the changelog section it is listed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChangelogSection {
    #[serde(rename = "type")]
    pub commit_type: String,
    pub section: String,
    #[serde(default)]
    pub hidden: bool,
}

impl ChangelogSection {
    pub fn new(commit_type: &str, section: &str, hidden: bool) -> Self {
        Self {
            commit_type: commit_type.into(),
            section: section.into(),
            hidden,
        }
    }
}

pub fn default_changelog_sections() -> Vec<ChangelogSection> {
    vec![
        ChangelogSection::new("feat", "Features", false),
        ChangelogSection::new("feature", "Features", false),
        ChangelogSection::new("fix", "Bug Fixes", false),
        ChangelogSection::new("perf", "Performance Improvements", false),
        ChangelogSection::new("revert", "Reverts", false),
        ChangelogSection::new("docs", "Documentation", true),
        ChangelogSection::new("style", "Styles", true),
        ChangelogSection::new("chore", "Miscellaneous Chores", true),
        ChangelogSection::new("refactor", "Code Refactoring", true),
        ChangelogSection::new("test", "Tests", true),
        ChangelogSection::new("build", "Build System", true),
        ChangelogSection::new("ci", "Continuous Integration", true),
    ]
}

/// Java projects also surface dependency updates and documentation.
pub fn java_changelog_sections() -> Vec<ChangelogSection> {
    vec![
        ChangelogSection::new("feat", "Features", false),
        ChangelogSection::new("fix", "Bug Fixes", false),
        ChangelogSection::new("perf", "Performance Improvements", false),
        ChangelogSection::new("deps", "Dependencies", false),
        ChangelogSection::new("revert", "Reverts", false),
        ChangelogSection::new("docs", "Documentation", false),
        ChangelogSection::new("style", "Styles", true),
        ChangelogSection::new("chore", "Miscellaneous Chores", true),
        ChangelogSection::new("refactor", "Code Refactoring", true),
        ChangelogSection::new("test", "Tests", true),
        ChangelogSection::new("build", "Build System", true),
        ChangelogSection::new("ci", "Continuous Integration", true),
    ]
}

/// Everything needed to render one release's notes besides the commits.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct NotesContext {
    pub version: Version,
    pub current_tag: String,
    #[builder(default)]
    pub previous_tag: Option<String>,
    /// Base web URL of the repository, used for compare and commit links.
    #[builder(default)]
    pub repository_url: Option<String>,
    #[builder(default = "chrono::Local::now().date_naive()")]
    pub date: NaiveDate,
    #[builder(default = "default_changelog_sections()")]
    pub sections: Vec<ChangelogSection>,
}

#[derive(Debug, Serialize)]
struct RenderedSection {
    title: String,
    entries: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RenderContext {
    heading: String,
    sections: Vec<RenderedSection>,
}

/// Renders release notes with a tera template.
#[derive(Debug, Clone)]
pub struct ChangelogNotes {
    template: String,
}

impl Default for ChangelogNotes {
    fn default() -> Self {
        Self {
            template: DEFAULT_NOTES_TEMPLATE.into(),
        }
    }
}

impl ChangelogNotes {
    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn build_notes(
        &self,
        commits: &[ConventionalCommit],
        context: &NotesContext,
    ) -> Result<String> {
        let render = RenderContext {
            heading: heading(context),
            sections: sections(commits, context),
        };

        let tera_context = tera::Context::from_serialize(&render)?;
        let rendered = tera::Tera::one_off(&self.template, &tera_context, false)?;

        Ok(format!("{}\n", rendered.trim_end()))
    }
}

/// True when notes carry nothing but their heading.
pub fn is_empty_notes(notes: &str) -> bool {
    notes.trim().lines().count() <= 1
}

fn heading(context: &NotesContext) -> String {
    let date = context.date.format("%Y-%m-%d");
    match (&context.repository_url, &context.previous_tag) {
        (Some(url), Some(previous)) => format!(
            "[{}]({}/compare/{}...{}) ({date})",
            context.version,
            url.trim_end_matches('/'),
            previous,
            context.current_tag
        ),
        _ => format!("{} ({date})", context.version),
    }
}

fn entry(commit: &ConventionalCommit, text: &str, repository_url: Option<&str>) -> String {
    let mut line = match &commit.scope {
        Some(scope) => format!("**{scope}:** {text}"),
        None => text.to_string(),
    };

    if !commit.sha.is_empty() {
        let short: String = commit.sha.chars().take(7).collect();
        match repository_url {
            Some(url) => line.push_str(&format!(
                " ([{short}]({}/commit/{}))",
                url.trim_end_matches('/'),
                commit.sha
            )),
            None => line.push_str(&format!(" ({short})")),
        }
    }

    line
}

fn sections(
    commits: &[ConventionalCommit],
    context: &NotesContext,
) -> Vec<RenderedSection> {
    let url = context.repository_url.as_deref();
    let mut rendered: Vec<RenderedSection> = vec![];

    let breaking: Vec<String> = commits
        .iter()
        .filter(|commit| commit.breaking)
        .map(|commit| {
            let text = commit
                .notes
                .iter()
                .find(|note| note.title == BREAKING_CHANGE_NOTE)
                .map(|note| note.text.as_str())
                .unwrap_or(commit.bare_message.as_str());
            entry(commit, text, url)
        })
        .collect();

    if !breaking.is_empty() {
        rendered.push(RenderedSection {
            title: BREAKING_CHANGES_TITLE.into(),
            entries: breaking,
        });
    }

    for section in context.sections.iter().filter(|s| !s.hidden) {
        let entries = commits
            .iter()
            .filter(|commit| commit.commit_type == section.commit_type)
            .map(|commit| entry(commit, &commit.bare_message, url));

        // types sharing a title (feat and feature) share a section
        match rendered.iter_mut().find(|r| r.title == section.section) {
            Some(existing) => existing.entries.extend(entries),
            None => rendered.push(RenderedSection {
                title: section.section.clone(),
                entries: entries.collect(),
            }),
        }
    }

    rendered.retain(|section| !section.entries.is_empty());
    rendered
}
