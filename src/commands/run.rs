use serde::Serialize;
use std::path::Path;

use super::attach::{attach_diagram, flow_nodes};
use super::prepare::prepare_document;
use super::summarize::{summarize_dir, SummaryReport};
use super::{BatchReport, Outcome};
use crate::config::Config;
use crate::error::Result;
use crate::grouping::GroupingEngine;
use crate::report::ReportDocument;
use crate::scan;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Summary file name, overriding the configured one
    pub output: Option<String>,
    pub diagram: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub prepared: BatchReport,
    pub summary: SummaryReport,
}

/// Group, attach the diagram and persist one result file in a single write.
///
/// The result is saved before its diagram, and the diagram is rewritten on
/// every run so a deleted one comes back.
pub async fn process_file(
    path: &Path,
    config: &Config,
    engine: &GroupingEngine,
    diagram: bool,
) -> Outcome {
    let mut doc = match ReportDocument::load(path).await {
        Ok(doc) => doc,
        Err(e) => return Outcome::from_error(e),
    };
    let original = doc.clone();

    let Some(prepared) = prepare_document(&doc, engine) else {
        return Outcome::NoSteps;
    };

    let grouped = prepared.grouped.or_prepared();
    let groups = grouped.parent_count();
    let nodes = if diagram { flow_nodes(&grouped) } else { Vec::new() };
    doc.set_steps(grouped.into_steps());

    let diagram = match attach_diagram(&mut doc, &nodes, path, config) {
        Ok(diagram) => diagram,
        Err(e) => return Outcome::from_error(e),
    };

    let changed = doc != original;
    if changed {
        if let Err(e) = doc.save(path).await {
            return Outcome::from_error(e);
        }
    }
    if let Some(diagram) = &diagram {
        if let Err(e) = diagram.write(path).await {
            return Outcome::from_error(e);
        }
    }

    if !changed {
        return Outcome::Unchanged;
    }
    Outcome::Grouped {
        groups,
        diagram: diagram.map(|diagram| diagram.file_name),
        written: true,
    }
}

/// Prepare and attach every result file, then write the summary.
pub async fn run_pipeline(
    results_dir: &Path,
    config: &Config,
    options: &RunOptions,
) -> Result<RunReport> {
    let output_name = options
        .output
        .as_deref()
        .unwrap_or(&config.summary_file_name);
    let files = scan::result_files(
        results_dir,
        &[output_name, config.summary_file_name.as_str()],
    )?;
    let engine = config.grouping_engine();
    let diagram = options.diagram && config.diagram.enabled;

    let mut prepared = BatchReport::new(results_dir);
    for path in files {
        let outcome = process_file(&path, config, &engine, diagram).await;
        prepared.push(&path, outcome);
    }

    let summary = summarize_dir(results_dir, config, options.output.as_deref()).await?;

    Ok(RunReport { prepared, summary })
}
