use crate::{
    commit::ConventionalCommit,
    result::Result,
    version::Version,
    versioning::{VersionUpdate, VersioningStrategy},
};

/// Maintains an `sp.N` pre-release counter, leaving major/minor/patch alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServicePackStrategy;

impl VersioningStrategy for ServicePackStrategy {
    fn determine_release_type(
        &self,
        _version: &Version,
        _commits: &[ConventionalCommit],
    ) -> Result<VersionUpdate> {
        Ok(VersionUpdate::ServicePack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_starts_and_increments() {
        let first = ServicePackStrategy
            .bump(&Version::parse("1.2.3").unwrap(), &[])
            .unwrap();
        assert_eq!(first.to_string(), "1.2.3-sp.1");

        let second = ServicePackStrategy.bump(&first, &[]).unwrap();
        assert_eq!(second.to_string(), "1.2.3-sp.2");
    }
}
