use log::*;
use serde_json::{Value, json};

use crate::{
    error::PlannerError,
    result::Result,
    updater::{Updater, generic_json::to_json_string},
    version::Version,
};

/// Updates an Expo `app.json`: the app version, the iOS build number and
/// the Android version code derived from the Expo SDK major version.
#[derive(Debug, Clone)]
pub struct AppJson {
    version: Version,
    expo_sdk_version: Option<Version>,
}

impl AppJson {
    pub fn new(version: Version, expo_sdk_version: Option<Version>) -> Self {
        Self {
            version,
            expo_sdk_version,
        }
    }

    fn version_code(&self) -> Result<u64> {
        let sdk = self.expo_sdk_version.as_ref().ok_or_else(|| {
            PlannerError::updater(
                "unable to determine the Expo SDK version; make sure expo is a dependency",
            )
        })?;

        Ok(sdk.major * 10_000_000
            + self.version.major * 10_000
            + self.version.minor * 100
            + self.version.patch)
    }
}

impl Updater for AppJson {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let content = content.unwrap_or_default();
        let mut document: Value = serde_json::from_str(content)?;

        let Some(expo) = document.get_mut("expo").filter(|e| e.is_object())
        else {
            return Err(PlannerError::updater("app.json has no expo section"));
        };

        info!("updating Expo version to {}", self.version);
        expo["version"] = json!(self.version.to_string());

        if let Some(build_number) = expo.pointer_mut("/ios/buildNumber") {
            *build_number = json!(self.version.to_string());
        }

        if expo.pointer("/android/versionCode").is_some() {
            let code = self.version_code()?;
            info!("updating Android versionCode to {code}");
            expo["android"]["versionCode"] = json!(code);
        }

        to_json_string(&document, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    const APP: &str = r#"{
  "expo": {
    "name": "app",
    "version": "1.0.0",
    "ios": { "buildNumber": "1.0.0" },
    "android": { "versionCode": 440010000 }
  }
}
"#;

    #[test]
    fn test_updates_all_platform_versions() {
        let updated = AppJson::new(v("2.3.4"), Some(v("44.0.0")))
            .update_content(Some(APP))
            .unwrap();
        let value: Value = serde_json::from_str(&updated).unwrap();
        assert_eq!(value["expo"]["version"], "2.3.4");
        assert_eq!(value["expo"]["ios"]["buildNumber"], "2.3.4");
        assert_eq!(value["expo"]["android"]["versionCode"], 440020304);
    }

    #[test]
    fn test_missing_platform_sections_are_left_alone() {
        let app = r#"{"expo": {"version": "1.0.0"}}"#;
        let updated = AppJson::new(v("1.1.0"), None)
            .update_content(Some(app))
            .unwrap();
        let value: Value = serde_json::from_str(&updated).unwrap();
        assert_eq!(value["expo"]["version"], "1.1.0");
        assert!(value["expo"].get("ios").is_none());
        assert!(value["expo"].get("android").is_none());
    }

    #[test]
    fn test_version_code_requires_sdk_version() {
        let result = AppJson::new(v("2.3.4"), None).update_content(Some(APP));
        assert!(result.is_err());
    }
}
