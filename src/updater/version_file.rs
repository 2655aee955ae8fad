use crate::{result::Result, updater::Updater, version::Version};

/// Replaces a plain `version.txt` with the new version.
#[derive(Debug, Clone)]
pub struct VersionFile {
    version: Version,
}

impl VersionFile {
    pub fn new(version: Version) -> Self {
        Self { version }
    }
}

impl Updater for VersionFile {
    fn update_content(&self, _content: Option<&str>) -> Result<String> {
        Ok(format!("{}\n", self.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_content() {
        let updater = VersionFile::new(Version::parse("2.0.0").unwrap());
        assert_eq!(updater.update_content(Some("1.9.9\n")).unwrap(), "2.0.0\n");
        assert_eq!(updater.update_content(None).unwrap(), "2.0.0\n");
    }
}
