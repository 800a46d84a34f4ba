use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{BatchReport, Outcome};
use crate::config::Config;
use crate::error::Result;
use crate::report::ReportDocument;
use crate::scan;
use crate::summary::{self, TestCaseSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    pub batch: BatchReport,
    pub output: PathBuf,
    pub test_cases: usize,
}

/// Summarize every result file in `results_dir` into one JSON file.
///
/// `output` overrides the configured file name. Unreadable files are skipped;
/// failing to write the summary itself is an error.
pub async fn summarize_dir(
    results_dir: &Path,
    config: &Config,
    output: Option<&str>,
) -> Result<SummaryReport> {
    let output_name = output.unwrap_or(&config.summary_file_name);
    let files = scan::result_files(
        results_dir,
        &[output_name, config.summary_file_name.as_str()],
    )?;

    let mut batch = BatchReport::new(results_dir);
    let mut summaries = Vec::new();
    for path in files {
        match ReportDocument::load(&path).await {
            Ok(doc) => {
                summaries.push(TestCaseSummary::from_document(&doc));
                batch.push(&path, Outcome::Summarized);
            }
            Err(e) => batch.push(&path, Outcome::from_error(e)),
        }
    }

    let output_path = results_dir.join(output_name);
    summary::write_summary(&output_path, &summaries).await?;

    Ok(SummaryReport {
        batch,
        output: output_path,
        test_cases: summaries.len(),
    })
}
