use serde_json::{Map, Value};

use crate::{
    error::PlannerError,
    result::Result,
    updater::{Updater, generic_json::to_json_string},
    version::VersionsMap,
};

/// Records released versions keyed by package path in a JSON manifest,
/// creating the manifest when it does not exist yet.
#[derive(Debug, Clone)]
pub struct ReleaseManifest {
    versions: VersionsMap,
}

impl ReleaseManifest {
    pub fn new(versions: VersionsMap) -> Self {
        Self { versions }
    }

    pub fn versions(&self) -> &VersionsMap {
        &self.versions
    }

    pub fn versions_mut(&mut self) -> &mut VersionsMap {
        &mut self.versions
    }
}

impl Updater for ReleaseManifest {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let content = content.unwrap_or_default();
        let mut manifest = if content.trim().is_empty() {
            Map::new()
        } else {
            match serde_json::from_str(content)? {
                Value::Object(map) => map,
                _ => {
                    return Err(PlannerError::updater(
                        "release manifest must be a JSON object",
                    ));
                }
            }
        };

        for (path, version) in &self.versions {
            manifest.insert(path.clone(), Value::String(version.to_string()));
        }

        to_json_string(&Value::Object(manifest), content)
    }
}
