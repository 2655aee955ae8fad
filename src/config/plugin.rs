use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Options of the Maven workspace plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MavenWorkspaceConfig {
    /// Parse every `pom.xml` in the repository, not only configured
    /// packages, so unconfigured artifacts can be released when a
    /// dependency changes
    #[serde(default = "default_true")]
    pub consider_all_artifacts: bool,
    /// Combine in-scope candidates into a single pull request
    #[serde(default = "default_true")]
    pub merge: bool,
    /// JSON file recording released versions keyed by package path
    #[serde(default)]
    pub manifest_path: Option<String>,
}

impl Default for MavenWorkspaceConfig {
    fn default() -> Self {
        Self {
            consider_all_artifacts: true,
            merge: true,
            manifest_path: None,
        }
    }
}

/// Options of the Node workspace plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NodeWorkspaceConfig {
    /// Combine in-scope candidates into a single pull request
    #[serde(default = "default_true")]
    pub merge: bool,
    #[serde(default)]
    pub manifest_path: Option<String>,
}

impl Default for NodeWorkspaceConfig {
    fn default() -> Self {
        Self {
            merge: true,
            manifest_path: None,
        }
    }
}

/// Options of the standalone merge plugin
#[derive(
    Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(default)]
pub struct MergeConfig {
    pub pull_request_title_pattern: Option<String>,
}

/// Plugins run, in order, over the candidates of all packages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PluginConfig {
    MavenWorkspace(MavenWorkspaceConfig),
    NodeWorkspace(NodeWorkspaceConfig),
    Merge(MergeConfig),
}
