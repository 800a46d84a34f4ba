use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ReportError, Result};

/// Whether a file name looks like an Allure result document.
///
/// Matches `*-result.json`, and any `*.json` whose name mentions `result`,
/// case-insensitively.
pub fn is_result_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.ends_with("-result.json") || (lower.ends_with(".json") && lower.contains("result"))
}

/// Result documents directly inside `results_dir`, sorted by file name.
///
/// `exclude` names files that match the pattern but are produced by this
/// tool, such as the summary file.
pub fn result_files(results_dir: &Path, exclude: &[&str]) -> Result<Vec<PathBuf>> {
    if !results_dir.is_dir() {
        return Err(ReportError::ResultsDirNotFound {
            path: results_dir.to_path_buf(),
        });
    }

    let files = WalkDir::new(results_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            is_result_file(&name) && !exclude.iter().any(|excluded| OsStr::new(excluded) == entry.file_name())
        })
        .map(|entry| entry.into_path())
        .collect();

    Ok(files)
}

/// File name for progress messages.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
