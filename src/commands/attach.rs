use std::path::Path;
use tokio::fs;

use super::{BatchReport, Outcome};
use crate::config::Config;
use crate::diagram::{self, FlowNode};
use crate::error::{ReportError, Result};
use crate::grouping::{GroupedSteps, GroupingEngine};
use crate::report::ReportDocument;
use crate::scan;

pub fn flow_nodes(grouped: &GroupedSteps) -> Vec<FlowNode> {
    grouped.parents().map(FlowNode::from_step).collect()
}

/// A rendered diagram, written next to its result file once the result
/// itself has been saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramFile {
    pub file_name: String,
    pub html: String,
}

impl DiagramFile {
    pub async fn write(&self, report_path: &Path) -> Result<()> {
        let html_path = report_path.with_file_name(&self.file_name);
        fs::write(&html_path, &self.html)
            .await
            .map_err(|source| ReportError::Write {
                path: html_path.clone(),
                source,
            })
    }
}

/// Render the diagram for `report_path` and register it on `doc`.
///
/// Nothing is written to disk. `None` when there are no nodes.
pub fn attach_diagram(
    doc: &mut ReportDocument,
    nodes: &[FlowNode],
    report_path: &Path,
    config: &Config,
) -> Result<Option<DiagramFile>> {
    let Some(html) = diagram::render_html(nodes, &config.diagram) else {
        return Ok(None);
    };

    let file_name = config.diagram_file_name(report_path);
    doc.upsert_attachment(&diagram::attachment(&config.diagram, &file_name))?;
    Ok(Some(DiagramFile { file_name, html }))
}

/// Render and attach the business step diagram of one result file.
///
/// The steps themselves are not rewritten; groups are derived in memory when
/// the file has not been prepared yet. The result is saved before the
/// diagram, so a failed save never leaves an unreferenced diagram behind.
pub async fn attach_file(
    path: &Path,
    config: &Config,
    engine: &GroupingEngine,
    dry_run: bool,
) -> Outcome {
    let mut doc = match ReportDocument::load(path).await {
        Ok(doc) => doc,
        Err(e) => return Outcome::from_error(e),
    };
    if !doc.has_steps() {
        return Outcome::NoSteps;
    }

    let nodes = flow_nodes(&engine.resolve_groups(doc.steps()));
    let diagram = match attach_diagram(&mut doc, &nodes, path, config) {
        Ok(Some(diagram)) => diagram,
        Ok(None) => return Outcome::NoGroups,
        Err(e) => return Outcome::from_error(e),
    };

    if !dry_run {
        if let Err(e) = doc.save(path).await {
            return Outcome::from_error(e);
        }
        if let Err(e) = diagram.write(path).await {
            return Outcome::from_error(e);
        }
    }

    Outcome::Attached {
        diagram: diagram.file_name,
        written: !dry_run,
    }
}

pub async fn attach_dir(results_dir: &Path, config: &Config, dry_run: bool) -> Result<BatchReport> {
    let files = scan::result_files(results_dir, &[config.summary_file_name.as_str()])?;
    let engine = config.grouping_engine();

    let mut report = BatchReport::new(results_dir);
    for path in files {
        let outcome = attach_file(&path, config, &engine, dry_run).await;
        report.push(&path, outcome);
    }

    Ok(report)
}
