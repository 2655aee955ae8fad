//! Read access to repository files on a branch.
//!
//! This is the narrow interface the planner needs from a forge: fetch a file
//! by path and locate files by name or glob. Implementations may talk to a
//! remote API or, like [`LocalRepository`], read a checkout from disk.
use async_trait::async_trait;

use crate::result::Result;

mod local;

pub use local::LocalRepository;

/// File contents fetched from a branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContents {
    /// Raw content as stored (forges may return it encoded).
    pub content: String,
    /// Decoded UTF-8 content used by updaters.
    pub parsed_content: String,
    /// Blob identifier of the file.
    pub sha: String,
}

impl FileContents {
    pub fn new(parsed_content: impl Into<String>) -> Self {
        let parsed_content = parsed_content.into();
        Self {
            content: parsed_content.clone(),
            parsed_content,
            sha: String::new(),
        }
    }
}

/// Repository file access used by strategies and workspace plugins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryFiles: Send + Sync {
    /// Fetches a file from `branch`.
    ///
    /// Fails with [`crate::error::PlannerError::FileNotFound`] when the file
    /// does not exist so callers can decide whether to create it.
    async fn get_file_contents_on_branch(
        &self,
        path: String,
        branch: String,
    ) -> Result<FileContents>;

    /// Returns paths of every file named `filename` on `branch`. When a
    /// `prefix` is given only files under it are returned, relative to it.
    async fn find_files_by_filename_and_ref(
        &self,
        filename: String,
        branch: String,
        prefix: Option<String>,
    ) -> Result<Vec<String>>;

    /// Returns paths matching `glob` on `branch`, relative to `prefix` when
    /// one is given.
    async fn find_files_by_glob_and_ref(
        &self,
        glob: String,
        branch: String,
        prefix: Option<String>,
    ) -> Result<Vec<String>>;
}
