//! Node manifest updaters: `package.json`, lock files and sample apps.
use log::*;
use serde_json::{Map, Value, json};

use crate::{
    error::PlannerError,
    result::Result,
    updater::{Updater, generic_json::to_json_string},
    version::{Version, VersionsMap},
};

/// Dependency sections in the order notes are reported.
pub const DEPENDENCY_TYPES: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

const RANGE_PREFIXES: [&str; 7] = [">=", "<=", "^", "~", ">", "<", "="];

const WORKSPACE_PROTOCOL: &str = "workspace:";

/// True for `workspace:` protocol specifiers, which the package manager
/// resolves at publish time.
pub fn is_workspace_protocol(spec: &str) -> bool {
    spec.starts_with(WORKSPACE_PROTOCOL)
}

/// The range `current` should become for `version`, keeping its operator.
/// `None` when the specifier is not a plain semver range (`workspace:`,
/// `file:`, tags such as `latest`).
pub fn updated_range(current: &str, version: &Version) -> Option<String> {
    if is_workspace_protocol(current) {
        return None;
    }

    let prefix = RANGE_PREFIXES
        .iter()
        .find(|prefix| current.starts_with(**prefix))
        .copied()
        .unwrap_or_default();

    let starts_with_digit = current[prefix.len()..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit());

    starts_with_digit.then(|| format!("{prefix}{version}"))
}

fn parse_object(content: &str) -> Result<Value> {
    let document: Value = serde_json::from_str(content)?;
    if !document.is_object() {
        return Err(PlannerError::updater("expected a JSON object"));
    }
    Ok(document)
}

fn update_dependency_section(
    section: &mut Map<String, Value>,
    versions: &VersionsMap,
) {
    for (name, spec) in section.iter_mut() {
        let (Some(version), Some(current)) = (versions.get(name), spec.as_str())
        else {
            continue;
        };

        if let Some(range) = updated_range(current, version)
            && range != current
        {
            debug!("updating dependency {name} from {current} to {range}");
            *spec = json!(range);
        }
    }
}

/// Sets the package version and, optionally, ranges of workspace
/// dependencies in every dependency section.
#[derive(Debug, Clone, Default)]
pub struct PackageJson {
    version: Option<Version>,
    dependency_versions: Option<VersionsMap>,
}

impl PackageJson {
    pub fn new(version: Version) -> Self {
        Self {
            version: Some(version),
            dependency_versions: None,
        }
    }

    pub fn with_dependencies(version: Version, versions: VersionsMap) -> Self {
        Self {
            version: Some(version),
            dependency_versions: Some(versions),
        }
    }
}

impl Updater for PackageJson {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let content = content.unwrap_or_default();
        let mut document = parse_object(content)?;

        if let Some(version) = &self.version {
            document["version"] = json!(version.to_string());
        }

        if let Some(versions) = &self.dependency_versions {
            for dep_type in DEPENDENCY_TYPES {
                if let Some(section) = document
                    .get_mut(dep_type)
                    .and_then(|section| section.as_object_mut())
                {
                    update_dependency_section(section, versions);
                }
            }
        }

        to_json_string(&document, content)
    }
}

/// Updates `package-lock.json` / `npm-shrinkwrap.json` for the root package
/// and any workspace packages listed in the lock file.
#[derive(Debug, Clone)]
pub struct PackageLockJson {
    version: Version,
    versions: VersionsMap,
}

impl PackageLockJson {
    pub fn new(version: Version, versions: VersionsMap) -> Self {
        Self { version, versions }
    }
}

impl Updater for PackageLockJson {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let content = content.unwrap_or_default();
        let mut document = parse_object(content)?;
        document["version"] = json!(self.version.to_string());

        let lockfile_version = document["lockfileVersion"].as_u64().unwrap_or(1);

        if lockfile_version >= 2
            && let Some(packages) = document
                .get_mut("packages")
                .and_then(|packages| packages.as_object_mut())
        {
            if let Some(root) = packages.get_mut("") {
                root["version"] = json!(self.version.to_string());
            }

            for entry in packages.values_mut() {
                let name = entry["name"].as_str().map(String::from);
                if let Some(version) =
                    name.and_then(|name| self.versions.get(&name))
                {
                    entry["version"] = json!(version.to_string());
                }
            }
        }

        to_json_string(&document, content)
    }
}

/// Points a sample app's dependency on the released package at the new
/// version.
#[derive(Debug, Clone)]
pub struct SamplesPackageJson {
    package_name: String,
    version: Version,
}

impl SamplesPackageJson {
    pub fn new(package_name: impl Into<String>, version: Version) -> Self {
        Self {
            package_name: package_name.into(),
            version,
        }
    }
}

impl Updater for SamplesPackageJson {
    fn update_content(&self, content: Option<&str>) -> Result<String> {
        let content = content.unwrap_or_default();
        let mut document = parse_object(content)?;

        let Some(dependency) = document
            .get_mut("dependencies")
            .and_then(|deps| deps.get_mut(self.package_name.as_str()))
        else {
            return Ok(content.to_string());
        };

        *dependency = json!(format!("^{}", self.version));
        to_json_string(&document, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    const PACKAGE: &str = r#"{
  "name": "@here/pkg-b",
  "version": "1.0.0",
  "dependencies": {
    "@here/pkg-a": "^1.1.1",
    "left-pad": "^1.0.0"
  },
  "devDependencies": {
    "@here/pkg-c": "workspace:*",
    "@here/pkg-d": "~2.0.0"
  },
  "peerDependencies": {
    "@here/pkg-a": ">=1.0.0"
  }
}
"#;

    #[test]
    fn test_updated_range_keeps_operator() {
        assert_eq!(updated_range("^1.0.0", &v("1.2.0")).as_deref(), Some("^1.2.0"));
        assert_eq!(updated_range("~1.0.0", &v("1.2.0")).as_deref(), Some("~1.2.0"));
        assert_eq!(updated_range(">=1.0.0", &v("1.2.0")).as_deref(), Some(">=1.2.0"));
        assert_eq!(updated_range("1.0.0", &v("1.2.0")).as_deref(), Some("1.2.0"));
        assert_eq!(updated_range("workspace:^", &v("1.2.0")), None);
        assert_eq!(updated_range("file:../a", &v("1.2.0")), None);
        assert_eq!(updated_range("latest", &v("1.2.0")), None);
    }

    #[test]
    fn test_updates_version_only() {
        let updated = PackageJson::new(v("1.0.1"))
            .update_content(Some(PACKAGE))
            .unwrap();
        let value: Value = serde_json::from_str(&updated).unwrap();
        assert_eq!(value["version"], "1.0.1");
        assert_eq!(value["dependencies"]["@here/pkg-a"], "^1.1.1");
        assert!(updated.starts_with("{\n  \"name\": \"@here/pkg-b\",\n  \"version\""));
    }

    #[test]
    fn test_updates_workspace_dependencies() {
        let versions = VersionsMap::from([
            ("@here/pkg-a".to_string(), v("1.1.2")),
            ("@here/pkg-c".to_string(), v("3.0.0")),
            ("@here/pkg-d".to_string(), v("2.0.1")),
        ]);
        let updated = PackageJson::with_dependencies(v("1.0.1"), versions)
            .update_content(Some(PACKAGE))
            .unwrap();
        let value: Value = serde_json::from_str(&updated).unwrap();

        assert_eq!(value["dependencies"]["@here/pkg-a"], "^1.1.2");
        assert_eq!(value["dependencies"]["left-pad"], "^1.0.0");
        assert_eq!(value["devDependencies"]["@here/pkg-c"], "workspace:*");
        assert_eq!(value["devDependencies"]["@here/pkg-d"], "~2.0.1");
        assert_eq!(value["peerDependencies"]["@here/pkg-a"], ">=1.1.2");
    }

    #[test]
    fn test_package_lock_v3() {
        let lock = r#"{
  "name": "root",
  "version": "1.0.0",
  "lockfileVersion": 3,
  "packages": {
    "": { "name": "root", "version": "1.0.0" },
    "packages/a": { "name": "@here/pkg-a", "version": "1.1.1" }
  }
}"#;
        let versions = VersionsMap::from([("@here/pkg-a".to_string(), v("1.1.2"))]);
        let updated = PackageLockJson::new(v("1.0.1"), versions)
            .update_content(Some(lock))
            .unwrap();
        let value: Value = serde_json::from_str(&updated).unwrap();
        assert_eq!(value["version"], "1.0.1");
        assert_eq!(value["packages"][""]["version"], "1.0.1");
        assert_eq!(value["packages"]["packages/a"]["version"], "1.1.2");
        assert!(!updated.ends_with('\n'));
    }

    #[test]
    fn test_samples_package_json() {
        let samples = r#"{"dependencies": {"@here/pkg-b": "^0.9.0"}}"#;
        let updated = SamplesPackageJson::new("@here/pkg-b", v("1.0.1"))
            .update_content(Some(samples))
            .unwrap();
        let value: Value = serde_json::from_str(&updated).unwrap();
        assert_eq!(value["dependencies"]["@here/pkg-b"], "^1.0.1");

        let unrelated = r#"{"dependencies": {}}"#;
        let unchanged = SamplesPackageJson::new("@here/pkg-b", v("1.0.1"))
            .update_content(Some(unrelated))
            .unwrap();
        assert_eq!(unchanged, unrelated);
    }

    #[test]
    fn test_rejects_non_object_json() {
        assert!(PackageJson::new(v("1.0.0")).update_content(Some("[]")).is_err());
    }
}
