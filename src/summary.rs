//! Flat per-test-case summary across a results directory.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tokio::fs;

use crate::error::{ReportError, Result};
use crate::report::ReportDocument;
use crate::step::StepRecord;

/// Name and status as written, `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutline {
    pub name: Value,
    pub status: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub name: Value,
    pub status: Value,
    /// Direct children only.
    pub substeps: Vec<StepOutline>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDetails {
    pub message: Value,
    pub trace: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseSummary {
    pub test_case_id: Value,
    pub uuid: Value,
    pub name: Value,
    pub description: Value,
    pub status: Value,
    pub status_details: StatusDetails,
    pub steps: Vec<StepSummary>,
}

impl StepSummary {
    pub fn from_step(step: &StepRecord) -> Self {
        let outline = StepOutline::from_step(step);
        Self {
            name: outline.name,
            status: outline.status,
            substeps: step.children().iter().map(StepOutline::from_step).collect(),
        }
    }
}

impl StepOutline {
    pub fn from_step(step: &StepRecord) -> Self {
        let field = |key: &str| step.field(key).cloned().unwrap_or(Value::Null);
        Self {
            name: field("name"),
            status: field("status"),
        }
    }
}

impl TestCaseSummary {
    pub fn from_document(doc: &ReportDocument) -> Self {
        let details = doc.field("statusDetails");
        let detail = |key: &str| details.get(key).cloned().unwrap_or(Value::Null);

        Self {
            test_case_id: doc.field("testCaseId"),
            uuid: doc.field("uuid"),
            name: doc.field("name"),
            description: doc.field("description"),
            status: doc.field("status"),
            status_details: StatusDetails {
                message: detail("message"),
                trace: detail("trace"),
            },
            steps: doc.steps().iter().map(StepSummary::from_step).collect(),
        }
    }
}

/// Pretty-printed summary file contents.
pub fn to_json(summaries: &[TestCaseSummary]) -> Result<String> {
    Ok(serde_json::to_string_pretty(summaries)?)
}

pub async fn write_summary(path: &Path, summaries: &[TestCaseSummary]) -> Result<()> {
    let contents = to_json(summaries)?;
    fs::write(path, contents)
        .await
        .map_err(|source| ReportError::SummaryWrite {
            path: path.to_path_buf(),
            source,
        })
}
