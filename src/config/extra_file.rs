use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{error::PlannerError, result::Result};

/// Format of an extra file, selecting the updater applied to it
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ExtraFileType {
    /// `x-release-please-*` markers
    #[default]
    Generic,
    Json,
    Toml,
    Xml,
    Pom,
}

/// Extra version-bearing file that accepts either a plain path or a typed
/// table.
///
/// # Examples
///
/// ```toml
/// extra_files = [
///     "src/version.rs",
///     { type = "json", path = "manifest.json", jsonpath = "$.version" },
///     { type = "xml", path = "/pom.xml", xpath = "//app.version" },
///     { type = "toml", path = "plugins/*/plugin.toml", jsonpath = "$.version", glob = true },
/// ]
/// ```
///
/// A leading `/` anchors the path at the repository root instead of the
/// package path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ExtraFileSpec {
    /// Plain path updated through generic markers
    Path(String),
    /// Typed extra file
    Typed(ExtraFile),
}

impl ExtraFileSpec {
    pub fn into_extra_file(self) -> ExtraFile {
        match self {
            ExtraFileSpec::Path(path) => ExtraFile {
                path,
                ..Default::default()
            },
            ExtraFileSpec::Typed(file) => file,
        }
    }
}

/// Typed extra file configuration
#[derive(
    Debug,
    Default,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Builder,
)]
#[builder(setter(into), default)]
pub struct ExtraFile {
    #[serde(rename = "type", default)]
    pub file_type: ExtraFileType,
    pub path: String,
    /// Selector for json and toml files
    pub jsonpath: Option<String>,
    /// Selector for xml files
    pub xpath: Option<String>,
    /// Treat `path` as a glob resolved against the target branch
    #[serde(default)]
    pub glob: bool,
}

impl ExtraFile {
    /// Checks that the selector required by the file type is present.
    pub fn validate(&self) -> Result<()> {
        let missing = match self.file_type {
            ExtraFileType::Json | ExtraFileType::Toml => {
                self.jsonpath.is_none().then_some("jsonpath")
            }
            ExtraFileType::Xml => self.xpath.is_none().then_some("xpath"),
            ExtraFileType::Generic | ExtraFileType::Pom => None,
        };

        match missing {
            Some(field) => Err(PlannerError::configuration(format!(
                "extra file {} requires a {field}",
                self.path
            ))),
            None => Ok(()),
        }
    }
}
