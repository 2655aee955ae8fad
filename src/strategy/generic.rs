use async_trait::async_trait;

use crate::{
    result::Result,
    strategy::{
        StrategyContext,
        ecosystem::{BuildUpdatesOptions, Ecosystem},
    },
    updater::{Update, version_file::VersionFile},
};

/// Packages versioned through a plain `version.txt` and extra files.
#[derive(Debug, Default)]
pub struct GenericEcosystem;

#[async_trait]
impl Ecosystem for GenericEcosystem {
    async fn build_updates(
        &self,
        ctx: &StrategyContext,
        options: &BuildUpdatesOptions<'_>,
    ) -> Result<Vec<Update>> {
        Ok(vec![Update::new(
            ctx.add_path("version.txt")?,
            VersionFile::new(options.new_version.clone()),
        )])
    }
}
