use std::borrow::Cow;

use crate::{error::PlannerError, result::Result};

/// Path used for a package living at the repository root.
pub const ROOT_PROJECT_PATH: &str = ".";

/// Replaces backslashes with forward slashes. Uses Cow to avoid allocation
/// when the path is already normalized.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    }
}

pub fn is_root(package_path: &str) -> bool {
    package_path.is_empty() || package_path == ROOT_PROJECT_PATH
}

/// Resolves `file` against a package path.
///
/// Leading slashes are stripped when the package is at the root or the file
/// is root-anchored (`/CHANGELOG.md`); otherwise the package path is
/// prefixed. Any `.`, `..` or `~` segment or a leading `~` is rejected with
/// [`PlannerError::PathTraversal`]. Trailing slashes are removed.
pub fn add_path(package_path: &str, file: &str) -> Result<String> {
    let file = normalize_path(file);

    let joined = if is_root(package_path) || file.starts_with('/') {
        file.trim_start_matches('/').to_string()
    } else {
        format!(
            "{}/{}",
            normalize_path(package_path).trim_end_matches('/'),
            file
        )
    };

    let escapes = joined.starts_with('~')
        || joined
            .split('/')
            .any(|segment| matches!(segment, "." | ".." | "~"));

    if escapes {
        return Err(PlannerError::PathTraversal(joined));
    }

    Ok(joined.trim_end_matches('/').to_string())
}

/// Directory containing `path`, or `.` for top-level files.
pub fn parent_dir(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => dir.to_string(),
        _ => ROOT_PROJECT_PATH.to_string(),
    }
}

/// True when `path` is `ancestor` itself or lives underneath it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    is_root(ancestor)
        || path == ancestor
        || path.starts_with(&format!("{}/", ancestor.trim_end_matches('/')))
}
