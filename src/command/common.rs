//! Common functionality shared between planner commands
use log::*;
use serde::Serialize;
use std::{path::Path, sync::Arc};
use tokio::fs;

use releasaurus_planner::{
    Planner, config::PlannerConfig, repository::LocalRepository,
    result::Result,
};

/// Loads the configuration and builds a planner over the checkout at
/// `repo`.
pub async fn load_planner(
    repo: &Path,
    config_path: &Path,
) -> Result<(Planner, Arc<LocalRepository>)> {
    info!("loading configuration from {}", config_path.display());
    let config = PlannerConfig::load(config_path).await?;
    let repository = Arc::new(LocalRepository::new(repo));

    let planner = Planner::builder()
        .config(config)
        .repository(repository.clone())
        .build()?;

    Ok((planner, repository))
}

/// Writes `data` as pretty JSON to `out_file`, or prints it to stdout.
pub async fn write_json<T: Serialize>(
    data: &T,
    out_file: Option<&Path>,
) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;

    match out_file {
        Some(file_path) => {
            info!("writing output to: {}", file_path.display());
            if let Some(parent) = file_path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                fs::create_dir_all(parent).await?;
            }
            fs::write(file_path, &json).await?;
        }
        None => println!("{json}"),
    }

    Ok(())
}
