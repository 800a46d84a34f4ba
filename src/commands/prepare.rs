use std::path::Path;

use super::{BatchReport, Outcome};
use crate::config::Config;
use crate::error::Result;
use crate::grouping::{GroupedSteps, GroupingEngine};
use crate::report::ReportDocument;
use crate::scan;

/// Result of grouping a document in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub grouped: GroupedSteps,
    /// Whether the grouped steps differ from the document's current steps.
    pub changed: bool,
}

/// Group and aggregate the document's steps without touching the document.
/// `None` when there are no steps to work on.
pub fn prepare_document(doc: &ReportDocument, engine: &GroupingEngine) -> Option<Prepared> {
    if !doc.has_steps() {
        return None;
    }

    let grouped = engine.group(doc.steps());
    let changed = grouped.steps.as_slice() != doc.steps();
    Some(Prepared { grouped, changed })
}

/// Group one result file and rewrite it in place.
pub async fn prepare_file(path: &Path, engine: &GroupingEngine, dry_run: bool) -> Outcome {
    let mut doc = match ReportDocument::load(path).await {
        Ok(doc) => doc,
        Err(e) => return Outcome::from_error(e),
    };

    let Some(prepared) = prepare_document(&doc, engine) else {
        return Outcome::NoSteps;
    };
    if !prepared.changed {
        return Outcome::Unchanged;
    }

    let groups = prepared.grouped.parent_count();
    doc.set_steps(prepared.grouped.into_steps());

    if !dry_run {
        if let Err(e) = doc.save(path).await {
            return Outcome::from_error(e);
        }
    }

    Outcome::Grouped {
        groups,
        diagram: None,
        written: !dry_run,
    }
}

pub async fn prepare_dir(results_dir: &Path, config: &Config, dry_run: bool) -> Result<BatchReport> {
    let files = scan::result_files(results_dir, &[config.summary_file_name.as_str()])?;
    let engine = config.grouping_engine();

    let mut report = BatchReport::new(results_dir);
    for path in files {
        let outcome = prepare_file(&path, &engine, dry_run).await;
        report.push(&path, outcome);
    }

    Ok(report)
}
