//! Allure result documents on disk.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;

use crate::error::{ReportError, Result};
use crate::step::StepRecord;

const ATTACHMENTS_KEY: &str = "attachments";

/// An entry of a result's `attachments` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            source: Some(source.into()),
            content_type: Some(content_type.into()),
            extra: Map::new(),
        }
    }
}

/// One test case result.
///
/// Results nest steps the same way steps do, so the document is held as a
/// [`StepRecord`]: every field keeps its value and position through a rewrite
/// and only `steps` and `attachments` are ever changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReportDocument {
    root: StepRecord,
}

impl<'de> Deserialize<'de> for ReportDocument {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self {
            root: StepRecord::from(Value::Object(fields)),
        })
    }
}

impl ReportDocument {
    /// Parse a result document. The top level must be a JSON object.
    pub fn from_json(path: &Path, contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|source| ReportError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|source| ReportError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(path, &contents)
    }

    /// Compact JSON, as the Allure reporters write it.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Overwrite `path` with this document.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let contents = self.to_json()?;
        fs::write(path, contents)
            .await
            .map_err(|source| ReportError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    /// The steps to group, if there are any.
    pub fn steps(&self) -> &[StepRecord] {
        self.root.children()
    }

    pub fn has_steps(&self) -> bool {
        !self.steps().is_empty()
    }

    /// Replace the steps, keeping the position of an existing `steps` field.
    pub fn set_steps(&mut self, steps: Vec<StepRecord>) {
        self.root.set_children(steps);
    }

    /// A top-level field other than `steps`, `Null` when absent.
    pub fn field(&self, key: &str) -> Value {
        self.root.field(key).cloned().unwrap_or(Value::Null)
    }

    /// The `attachments` list as written, empty when absent or not a list.
    pub fn attachments(&self) -> &[Value] {
        self.root
            .field(ATTACHMENTS_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Add `attachment`, replacing any entry with the same source.
    pub fn upsert_attachment(&mut self, attachment: &Attachment) -> Result<()> {
        let entry = serde_json::to_value(attachment)?;
        let source = attachment.source.as_deref();

        if let Some(Value::Array(attachments)) = self.root.field_mut(ATTACHMENTS_KEY) {
            attachments.retain(|existing| existing.get("source").and_then(Value::as_str) != source);
            attachments.push(entry);
            return Ok(());
        }
        self.root.set_field(ATTACHMENTS_KEY, Value::Array(vec![entry]));
        Ok(())
    }
}
