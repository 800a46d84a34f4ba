pub mod attach;
pub mod prepare;
pub mod run;
pub mod summarize;

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::ReportError;
use crate::scan;

/// What happened to one result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Steps were grouped; `written` is false on dry runs.
    Grouped {
        groups: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        diagram: Option<String>,
        written: bool,
    },
    /// A diagram was rendered and registered as an attachment.
    Attached { diagram: String, written: bool },
    /// Added to the summary.
    Summarized,
    /// Already up to date.
    Unchanged,
    /// No `steps`, or an empty list.
    NoSteps,
    /// Nothing to draw.
    NoGroups,
    /// Unreadable or malformed input.
    Skipped { reason: String },
    /// A write failed.
    Failed { reason: String },
}

impl Outcome {
    pub fn from_error(err: ReportError) -> Self {
        match err {
            ReportError::Read { source, .. } => Outcome::Skipped {
                reason: format!("cannot read file: {}", source),
            },
            ReportError::Parse { source, .. } => Outcome::Skipped {
                reason: format!("cannot parse JSON: {}", source),
            },
            ReportError::Write { path, source } => Outcome::Failed {
                reason: format!("cannot write {}: {}", scan::display_name(&path), source),
            },
            other => Outcome::Failed {
                reason: other.to_string(),
            },
        }
    }

    pub fn is_problem(&self) -> bool {
        matches!(self, Outcome::Skipped { .. } | Outcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub file: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Per-file outcomes of one pass over a results directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub results_dir: PathBuf,
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn new(results_dir: &Path) -> Self {
        Self {
            results_dir: results_dir.to_path_buf(),
            files: Vec::new(),
        }
    }

    pub fn push(&mut self, path: &Path, outcome: Outcome) {
        self.files.push(FileOutcome {
            file: scan::display_name(path),
            outcome,
        });
    }

    pub fn outcome(&self, file: &str) -> Option<&Outcome> {
        self.files
            .iter()
            .find(|entry| entry.file == file)
            .map(|entry| &entry.outcome)
    }

    pub fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.files
            .iter()
            .filter(|entry| predicate(&entry.outcome))
            .count()
    }

    pub fn changed(&self) -> usize {
        self.count(|outcome| {
            matches!(
                outcome,
                Outcome::Grouped { .. } | Outcome::Attached { .. } | Outcome::Summarized
            )
        })
    }

    pub fn problems(&self) -> usize {
        self.count(Outcome::is_problem)
    }
}
