use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Ecosystems a package can be released as
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseType {
    #[default]
    Generic,
    Node,
    Expo,
    Java,
    Maven,
}

impl ReleaseType {
    /// Java and Maven packages share the snapshot release flow.
    pub fn is_java(&self) -> bool {
        matches!(self, ReleaseType::Java | ReleaseType::Maven)
    }

    /// Node and Expo packages are described by a `package.json`.
    pub fn is_node(&self) -> bool {
        matches!(self, ReleaseType::Node | ReleaseType::Expo)
    }
}

impl Display for ReleaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseType::Generic => f.write_str("generic"),
            ReleaseType::Node => f.write_str("node"),
            ReleaseType::Expo => f.write_str("expo"),
            ReleaseType::Java => f.write_str("java"),
            ReleaseType::Maven => f.write_str("maven"),
        }
    }
}
