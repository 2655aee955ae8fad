use async_trait::async_trait;
use serde_json::Value;

use crate::{
    result::Result,
    strategy::{
        StrategyContext,
        ecosystem::{BuildUpdatesOptions, Ecosystem},
        node::NodeEcosystem,
    },
    updater::{Update, app_json::AppJson},
    version::Version,
};

/// Expo apps: everything npm does plus `app.json`.
#[derive(Debug, Default)]
pub struct ExpoEcosystem {
    node: NodeEcosystem,
}

/// Expo SDK version from the `expo` dependency range, e.g. `~49.0.3`.
pub fn expo_sdk_version(package: &Value) -> Option<Version> {
    let range = package.pointer("/dependencies/expo")?.as_str()?;
    Version::parse(range.trim_start_matches(['^', '~'])).ok()
}

#[async_trait]
impl Ecosystem for ExpoEcosystem {
    fn normalize_component(&self, component: &str) -> String {
        self.node.normalize_component(component)
    }

    async fn default_package_name(
        &self,
        ctx: &StrategyContext,
    ) -> Result<Option<String>> {
        self.node.default_package_name(ctx).await
    }

    async fn build_updates(
        &self,
        ctx: &StrategyContext,
        options: &BuildUpdatesOptions<'_>,
    ) -> Result<Vec<Update>> {
        let mut updates = self.node.build_updates(ctx, options).await?;
        let package = self.node.parsed_package_json(ctx).await?;

        updates.push(Update::new(
            ctx.add_path("app.json")?,
            AppJson::new(options.new_version.clone(), expo_sdk_version(&package)),
        ));

        Ok(updates)
    }
}
