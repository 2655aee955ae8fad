use async_trait::async_trait;
use log::*;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tokio::sync::OnceCell;

use crate::{
    error::PlannerError,
    repository::FileContents,
    result::Result,
    strategy::{
        StrategyContext,
        ecosystem::{BuildUpdatesOptions, Ecosystem},
    },
    updater::{
        Update,
        package_json::{PackageJson, PackageLockJson, SamplesPackageJson},
    },
};

static SCOPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[\w-]+/").unwrap());

const LOCK_FILES: [&str; 2] = ["package-lock.json", "npm-shrinkwrap.json"];

/// Package name without its npm scope, as used for components.
pub fn normalize_package_name(name: &str) -> String {
    SCOPE_REGEX.replace(name, "").to_string()
}

/// npm packages: `package.json`, lock files and samples.
#[derive(Debug, Default)]
pub struct NodeEcosystem {
    package_json: OnceCell<FileContents>,
}

impl NodeEcosystem {
    /// The package's `package.json`, fetched once per run.
    pub async fn package_json(
        &self,
        ctx: &StrategyContext,
    ) -> Result<&FileContents> {
        self.package_json
            .get_or_try_init(|| async {
                let path = ctx.add_path("package.json")?;
                ctx.fetch_required(&path).await
            })
            .await
    }

    pub async fn parsed_package_json(
        &self,
        ctx: &StrategyContext,
    ) -> Result<Value> {
        let contents = self.package_json(ctx).await?;
        Ok(serde_json::from_str(&contents.parsed_content)?)
    }

    async fn package_name(&self, ctx: &StrategyContext) -> Result<String> {
        let package = self.parsed_package_json(ctx).await?;
        package
            .get("name")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| {
                PlannerError::configuration(format!(
                    "package.json at {} has no name",
                    ctx.path
                ))
            })
    }
}

#[async_trait]
impl Ecosystem for NodeEcosystem {
    fn normalize_component(&self, component: &str) -> String {
        normalize_package_name(component)
    }

    async fn default_package_name(
        &self,
        ctx: &StrategyContext,
    ) -> Result<Option<String>> {
        Ok(Some(self.package_name(ctx).await?))
    }

    async fn build_updates(
        &self,
        ctx: &StrategyContext,
        options: &BuildUpdatesOptions<'_>,
    ) -> Result<Vec<Update>> {
        let version = options.new_version;
        let package_name = match &ctx.config.package_name {
            Some(name) => name.clone(),
            None => self.package_name(ctx).await?,
        };
        let mut updates = vec![];

        for lock_file in LOCK_FILES {
            updates.push(Update::new(
                ctx.add_path(lock_file)?,
                PackageLockJson::new(
                    version.clone(),
                    options.versions_map.clone(),
                ),
            ));
        }

        updates.push(Update::new(
            ctx.add_path("samples/package.json")?,
            SamplesPackageJson::new(package_name, version.clone()),
        ));

        debug!("updating package.json of {} to {version}", ctx.path);
        updates.push(
            Update::new(
                ctx.add_path("package.json")?,
                PackageJson::new(version.clone()),
            )
            .with_cached_contents(self.package_json(ctx).await?.clone()),
        );

        Ok(updates)
    }
}
