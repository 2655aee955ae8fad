//! Configuration loading and parsing for `releasaurus-planner.toml` files.
//!
//! Packages are keyed by their path relative to the repository root and
//! plugins run in declaration order:
//!
//! ```toml
//! target_branch = "main"
//!
//! [packages."."]
//! release_type = "maven"
//!
//! [packages."packages/web"]
//! release_type = "node"
//!
//! [[plugins]]
//! type = "maven-workspace"
//! ```
use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

use crate::{
    pull_request::{PENDING_LABEL, SNAPSHOT_LABEL},
    result::Result,
};

pub mod extra_file;
pub mod package;
pub mod plugin;
pub mod release_type;

pub use extra_file::{ExtraFile, ExtraFileSpec, ExtraFileType};
pub use package::{DEFAULT_CHANGELOG_PATH, PackageConfig, PackageConfigBuilder};
pub use plugin::{
    MavenWorkspaceConfig, MergeConfig, NodeWorkspaceConfig, PluginConfig,
};
pub use release_type::ReleaseType;

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "releasaurus-planner.toml";
/// Default target branch of release pull requests.
pub const DEFAULT_TARGET_BRANCH: &str = "main";

/// Root configuration structure
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Builder,
)]
#[serde(default)]
#[builder(setter(into), default)]
pub struct PlannerConfig {
    /// Branch release pull requests target
    pub target_branch: String,
    /// Web URL of the repository used for changelog links
    pub repository_url: Option<String>,
    /// Labels applied to release pull requests
    pub labels: Vec<String>,
    /// Labels applied to snapshot bump pull requests
    pub snapshot_labels: Vec<String>,
    /// Packages keyed by path relative to the repository root
    pub packages: BTreeMap<String, PackageConfig>,
    /// Plugins run over the candidates of all packages
    pub plugins: Vec<PluginConfig>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            target_branch: DEFAULT_TARGET_BRANCH.into(),
            repository_url: None,
            labels: vec![PENDING_LABEL.into()],
            snapshot_labels: vec![SNAPSHOT_LABEL.into()],
            packages: BTreeMap::new(),
            plugins: vec![],
        }
    }
}

impl PlannerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(config.target_branch, DEFAULT_TARGET_BRANCH);
        assert_eq!(config.labels, vec![PENDING_LABEL.to_string()]);
        assert!(config.packages.is_empty());
    }

    #[test]
    fn loads_packages_and_plugins() {
        let toml = r#"
            target_branch = "develop"
            repository_url = "https://github.com/acme/widgets"

            [packages."."]
            release_type = "maven"

            [packages."packages/web"]
            release_type = "node"
            component = "web"

            [[plugins]]
            type = "maven-workspace"
            consider_all_artifacts = false
        "#;

        let config = PlannerConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.target_branch, "develop");
        assert_eq!(config.packages.len(), 2);
        assert_eq!(config.packages["."].release_type, ReleaseType::Maven);
        assert_eq!(
            config.packages["packages/web"].component.as_deref(),
            Some("web")
        );
        assert!(matches!(
            config.plugins[0],
            PluginConfig::MavenWorkspace(MavenWorkspaceConfig {
                consider_all_artifacts: false,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "[packages.\".\"]\nrelease_type = \"node\"\n")
            .unwrap();

        let config = PlannerConfig::load(&path).await.unwrap();
        assert_eq!(config.packages["."].release_type, ReleaseType::Node);
    }

    #[test]
    fn rejects_unknown_plugin() {
        let toml = "[[plugins]]\ntype = \"cargo-workspace\"\n";
        assert!(matches!(
            PlannerConfig::from_toml_str(toml),
            Err(crate::error::PlannerError::TomlParseError(_))
        ));
    }
}
