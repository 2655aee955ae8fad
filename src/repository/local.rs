//! Local checkout implementation of [`RepositoryFiles`] for offline runs.
use async_trait::async_trait;
use globset::Glob;
use log::*;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::{DirEntry, WalkDir};

use crate::{
    error::PlannerError,
    repository::{FileContents, RepositoryFiles},
    result::Result,
};

const IGNORED_DIRS: [&str; 4] = [".git", "node_modules", "target", ".venv"];

/// Reads files straight from a working tree. The branch argument is only
/// informational: whatever is checked out is what gets read.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
}

fn to_slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<String>>()
        .join("/")
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `content` to `path`, creating parent directories as needed.
    pub async fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full_path, content).await?;
        Ok(())
    }

    fn search_root(&self, prefix: &Option<String>) -> PathBuf {
        match prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() && prefix != "." => {
                self.root.join(prefix)
            }
            _ => self.root.clone(),
        }
    }

    /// Relative paths of every file under `base`, in sorted order.
    fn walk(&self, base: &Path) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(base)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_ignored(entry))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(base)
                    .ok()
                    .map(to_slash_path)
            })
            .collect();

        files.sort();
        files
    }
}

#[async_trait]
impl RepositoryFiles for LocalRepository {
    async fn get_file_contents_on_branch(
        &self,
        path: String,
        branch: String,
    ) -> Result<FileContents> {
        debug!("reading {path} from local checkout (branch: {branch})");

        match fs::read_to_string(self.root.join(&path)).await {
            Ok(content) => Ok(FileContents::new(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(PlannerError::FileNotFound(path))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_files_by_filename_and_ref(
        &self,
        filename: String,
        _branch: String,
        prefix: Option<String>,
    ) -> Result<Vec<String>> {
        let base = self.search_root(&prefix);

        Ok(self
            .walk(&base)
            .into_iter()
            .filter(|path| {
                path.rsplit('/').next().is_some_and(|name| name == filename)
            })
            .collect())
    }

    async fn find_files_by_glob_and_ref(
        &self,
        glob: String,
        _branch: String,
        prefix: Option<String>,
    ) -> Result<Vec<String>> {
        let matcher = Glob::new(&glob)?.compile_matcher();
        let base = self.search_root(&prefix);

        Ok(self
            .walk(&base)
            .into_iter()
            .filter(|path| matcher.is_match(path))
            .collect())
    }
}
