//! Maven `pom.xml` parsing and version updates.
use log::*;
use std::{collections::BTreeMap, ops::Range};

use crate::{
    result::Result,
    updater::{
        Updater,
        xml::{XmlText, splice, text_nodes},
    },
    version::{Version, VersionsMap},
};

const PROJECT_VERSION: [&str; 2] = ["project", "version"];
const PARENT_VERSION: [&str; 3] = ["project", "parent", "version"];
const DEPENDENCIES: [&str; 3] = ["project", "dependencies", "dependency"];
const MANAGED_DEPENDENCIES: [&str; 4] =
    ["project", "dependencyManagement", "dependencies", "dependency"];

/// A `<dependency>` entry of a POM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub scope: Option<String>,
    version_span: Option<Range<usize>>,
}

impl PomDependency {
    /// `groupId:artifactId`, when both are present.
    pub fn name(&self) -> Option<String> {
        match (&self.group_id, &self.artifact_id) {
            (Some(group), Some(artifact)) => Some(format!("{group}:{artifact}")),
            _ => None,
        }
    }

    pub fn is_test(&self) -> bool {
        self.scope.as_deref() == Some("test")
    }

    /// False for property references such as `${project.version}`.
    fn has_literal_version(&self) -> bool {
        self.version
            .as_deref()
            .is_some_and(|version| !version.starts_with("${"))
    }
}

/// The parts of a POM the planner cares about.
#[derive(Debug, Clone, Default)]
pub struct PomDocument {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub dependencies: Vec<PomDependency>,
    pub managed_dependencies: Vec<PomDependency>,
    version_span: Option<Range<usize>>,
    parent_version_span: Option<Range<usize>>,
}

fn collect_dependencies(
    nodes: &[XmlText],
    prefix: &[&str],
) -> Vec<PomDependency> {
    // keyed by the <dependency> element offset, so document order holds
    let mut dependencies: BTreeMap<usize, PomDependency> = BTreeMap::new();

    for node in nodes {
        if node.path.len() != prefix.len() + 1 || !node.is_under(prefix) {
            continue;
        }

        let Some(element) = node.path.get(prefix.len() - 1) else {
            continue;
        };

        let dependency = dependencies.entry(element.start).or_default();
        match node.element_name() {
            "groupId" => dependency.group_id = Some(node.text.clone()),
            "artifactId" => dependency.artifact_id = Some(node.text.clone()),
            "scope" => dependency.scope = Some(node.text.clone()),
            "version" => {
                dependency.version = Some(node.text.clone());
                dependency.version_span = Some(node.span.clone());
            }
            _ => {}
        }
    }

    dependencies.into_values().collect()
}

impl PomDocument {
    pub fn parse(content: &str) -> Result<Self> {
        let nodes = text_nodes(content)?;
        let mut document = PomDocument::default();

        for node in nodes.iter() {
            if node.is_at(&["project", "groupId"]) {
                document.group_id = Some(node.text.clone());
            } else if node.is_at(&["project", "artifactId"]) {
                document.artifact_id = Some(node.text.clone());
            } else if node.is_at(&PROJECT_VERSION) {
                document.version = Some(node.text.clone());
                document.version_span = Some(node.span.clone());
            } else if node.is_at(&PARENT_VERSION) {
                document.parent_version_span = Some(node.span.clone());
            }
        }

        document.dependencies = collect_dependencies(&nodes, &DEPENDENCIES);
        document.managed_dependencies =
            collect_dependencies(&nodes, &MANAGED_DEPENDENCIES);

        Ok(document)
    }

    /// `groupId:artifactId` of the project itself.
    pub fn name(&self) -> Option<String> {
        match (&self.group_id, &self.artifact_id) {
            (Some(group), Some(artifact)) => Some(format!("{group}:{artifact}")),
            _ => None,
        }
    }

    /// Dependencies whose declared version differs from `versions`.
    /// Regular dependencies are checked before dependency management, and
    /// each name is reported at most once.
    pub fn dependency_updates(
        &self,
        versions: &VersionsMap,
    ) -> Vec<(String, Version)> {
        versions
            .iter()
            .filter(|(name, version)| {
                self.dependencies
                    .iter()
                    .chain(self.managed_dependencies.iter())
                    .any(|dep| {
                        dep.name().as_deref() == Some(name.as_str())
                            && dep.has_literal_version()
                            && dep.version.as_deref()
                                != Some(version.to_string().as_str())
                    })
            })
            .map(|(name, version)| (name.clone(), version.clone()))
            .collect()
    }
}

/// Updates the project version (or the parent version when the project
/// inherits it) and, optionally, versions of workspace dependencies.
#[derive(Debug, Clone)]
pub struct PomXml {
    version: Version,
    dependency_versions: Option<VersionsMap>,
}

impl PomXml {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            dependency_versions: None,
        }
    }

    pub fn with_dependencies(version: Version, versions: VersionsMap) -> Self {
        Self {
            version,
            dependency_versions: Some(versions),
        }
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl Updater for PomXml {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let content = content.unwrap_or_default();
        let document = PomDocument::parse(content)?;
        let mut replacements = vec![];

        match (&document.version_span, &document.parent_version_span) {
            (Some(span), _) | (None, Some(span)) => {
                replacements.push((span.clone(), self.version.to_string()));
            }
            (None, None) => warn!("pom.xml has no version to update"),
        }

        if let Some(versions) = &self.dependency_versions {
            for dependency in document
                .dependencies
                .iter()
                .chain(document.managed_dependencies.iter())
            {
                let Some(version) = dependency
                    .name()
                    .and_then(|name| versions.get(&name))
                else {
                    continue;
                };

                if let Some(span) = &dependency.version_span
                    && dependency.has_literal_version()
                {
                    replacements.push((span.clone(), version.to_string()));
                }
            }
        }

        Ok(splice(content, replacements))
    }
}
