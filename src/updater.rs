//! File updates: a path plus a pure content transform.
//!
//! Strategies and workspace plugins describe edits as [`Update`]s. Nothing
//! is written while planning; the transforms are applied later by whoever
//! publishes the release pull request.
use log::*;
use std::{any::Any, fmt::Debug};

use crate::{
    repository::{FileContents, RepositoryFiles},
    result::Result,
};

pub mod app_json;
pub mod changelog;
pub mod composite;
pub mod generic;
pub mod generic_json;
pub mod generic_toml;
pub mod generic_xml;
pub mod java_update;
mod json_path;
pub mod package_json;
pub mod pom_xml;
pub mod release_manifest;
pub mod version_file;
pub mod versions_manifest;
mod xml;

pub use composite::{CompositeUpdater, merge_updates};

/// Access to the concrete type behind a `dyn Updater`.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Transforms the content of a single file to reflect a new version.
pub trait Updater: AsAny + Debug + Send + Sync {
    /// Returns the new file content. `None` means the file does not exist
    /// yet.
    fn update_content(&self, content: Option<&str>) -> Result<String>;
}

/// A pending edit to one file.
#[derive(Debug)]
pub struct Update {
    pub path: String,
    pub create_if_missing: bool,
    pub updater: Box<dyn Updater>,
    /// Content already fetched during planning, reused instead of fetching
    /// the file again.
    pub cached_file_contents: Option<FileContents>,
}

impl Update {
    pub fn new(path: impl Into<String>, updater: impl Updater) -> Self {
        Self {
            path: path.into(),
            create_if_missing: false,
            updater: Box::new(updater),
            cached_file_contents: None,
        }
    }

    /// An update that creates the file when it does not exist.
    pub fn creating(path: impl Into<String>, updater: impl Updater) -> Self {
        Self {
            create_if_missing: true,
            ..Self::new(path, updater)
        }
    }

    pub fn with_cached_contents(mut self, contents: FileContents) -> Self {
        self.cached_file_contents = Some(contents);
        self
    }

    /// Downcasts the updater to a concrete type.
    pub fn updater_as<T: Updater>(&self) -> Option<&T> {
        (*self.updater).as_any().downcast_ref::<T>()
    }

    pub fn updater_as_mut<T: Updater>(&mut self) -> Option<&mut T> {
        (*self.updater).as_any_mut().downcast_mut::<T>()
    }

    /// Cached contents, or the file fetched from `branch`. `None` when the
    /// file does not exist.
    pub async fn current_contents(
        &self,
        files: &dyn RepositoryFiles,
        branch: &str,
    ) -> Result<Option<FileContents>> {
        if let Some(cached) = &self.cached_file_contents {
            return Ok(Some(cached.clone()));
        }

        match files
            .get_file_contents_on_branch(self.path.clone(), branch.to_string())
            .await
        {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Computes the new content for this update. `None` when the file is
    /// missing and may not be created.
    pub async fn apply(
        &self,
        files: &dyn RepositoryFiles,
        branch: &str,
    ) -> Result<Option<String>> {
        match self.current_contents(files, branch).await? {
            Some(contents) => Ok(Some(
                self.updater.update_content(Some(&contents.parsed_content))?,
            )),
            None if self.create_if_missing => {
                Ok(Some(self.updater.update_content(None)?))
            }
            None => {
                warn!("file {} does not exist, skipping update", self.path);
                Ok(None)
            }
        }
    }
}
