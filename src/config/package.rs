use derive_builder::Builder;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    changelog_notes::ChangelogSection,
    config::{
        extra_file::{ExtraFile, ExtraFileSpec},
        release_type::ReleaseType,
    },
    release::DEFAULT_TAG_SEPARATOR,
    result::Result,
    version::Version,
    versioning::{VersioningOptions, VersioningStrategyType},
};

/// Default changelog file relative to the package path.
pub const DEFAULT_CHANGELOG_PATH: &str = "CHANGELOG.md";

/// Release configuration of a single package, keyed by its path in
/// [`crate::config::PlannerConfig::packages`]
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Builder,
)]
#[serde(default)] // Use default for missing fields
#[builder(setter(into), default)]
pub struct PackageConfig {
    /// [`ReleaseType`] selecting which version files are updated
    pub release_type: ReleaseType,
    /// Component name used in tags, titles and branch names. Derived from
    /// the package manifest when not provided.
    pub component: Option<String>,
    /// Package name when it differs from the component
    pub package_name: Option<String>,
    /// Versioning strategy key (see [`VersioningStrategyType`])
    pub versioning: String,
    /// Breaking changes only bump minor while major is 0
    pub bump_minor_pre_major: bool,
    /// Features only bump patch while major is 0
    pub bump_patch_for_minor_pre_major: bool,
    /// Label used by the prerelease versioning strategy (e.g. "beta")
    pub prerelease_type: Option<String>,
    /// Forces the next version, overriding every strategy
    pub release_as: Option<String>,
    /// Version used when there is no prior release
    #[schemars(with = "Option<String>")]
    pub initial_version: Option<Version>,
    /// Changelog path relative to the package
    pub changelog_path: String,
    /// Overrides the ecosystem's changelog sections
    pub changelog_sections: Option<Vec<ChangelogSection>>,
    pub include_component_in_tag: bool,
    pub include_v_in_tag: bool,
    pub tag_separator: String,
    pub pull_request_title_pattern: Option<String>,
    /// Additional version-bearing files
    pub extra_files: Vec<ExtraFileSpec>,
    /// Java `versions.txt` style manifest tracking multiple artifacts
    pub versions_file: Option<String>,
    /// Disables the Java snapshot bump pull requests
    pub skip_snapshot: bool,
    pub draft: bool,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            release_type: ReleaseType::default(),
            component: None,
            package_name: None,
            versioning: VersioningStrategyType::default().to_string(),
            bump_minor_pre_major: false,
            bump_patch_for_minor_pre_major: false,
            prerelease_type: None,
            release_as: None,
            initial_version: None,
            changelog_path: DEFAULT_CHANGELOG_PATH.into(),
            changelog_sections: None,
            include_component_in_tag: true,
            include_v_in_tag: true,
            tag_separator: DEFAULT_TAG_SEPARATOR.into(),
            pull_request_title_pattern: None,
            extra_files: vec![],
            versions_file: None,
            skip_snapshot: false,
            draft: false,
        }
    }
}

impl PackageConfig {
    pub fn versioning_options(&self) -> VersioningOptions {
        VersioningOptions {
            bump_minor_pre_major: self.bump_minor_pre_major,
            bump_patch_for_minor_pre_major: self.bump_patch_for_minor_pre_major,
            prerelease_type: self.prerelease_type.clone(),
        }
    }

    /// Extra files normalized to typed entries and validated.
    pub fn extra_files(&self) -> Result<Vec<ExtraFile>> {
        self.extra_files
            .iter()
            .cloned()
            .map(|spec| {
                let file = spec.into_extra_file();
                file.validate()?;
                Ok(file)
            })
            .collect()
    }

    /// Forced version, if `release_as` is set and parses.
    pub fn release_as_version(&self) -> Result<Option<Version>> {
        self.release_as
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(Version::parse_tag)
            .transpose()
    }
}
