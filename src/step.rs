//! Step records as they appear in Allure result files.
//!
//! Result files are written by many different reporters, so fields are read
//! leniently and written back exactly as they were unless grouping changes
//! them. Timestamps accept numbers or numeric strings.

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Outcome of a single step, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StepStatus {
    Passed,
    Failed,
    Broken,
    Skipped,
    Unknown,
    /// Any non-empty status outside the Allure vocabulary, lower-cased.
    Other(String),
}

impl StepStatus {
    /// Aggregation order: the first status present among a group's children wins.
    pub const PRIORITY: [StepStatus; 5] = [
        StepStatus::Failed,
        StepStatus::Broken,
        StepStatus::Skipped,
        StepStatus::Passed,
        StepStatus::Unknown,
    ];

    /// Parse a raw status. Empty strings carry no status.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.to_lowercase();
        let status = match lowered.as_str() {
            "" => return None,
            "passed" => StepStatus::Passed,
            "failed" => StepStatus::Failed,
            "broken" => StepStatus::Broken,
            "skipped" => StepStatus::Skipped,
            "unknown" => StepStatus::Unknown,
            _ => StepStatus::Other(lowered),
        };
        Some(status)
    }

    pub fn as_str(&self) -> &str {
        match self {
            StepStatus::Passed => "passed",
            StepStatus::Failed => "failed",
            StepStatus::Broken => "broken",
            StepStatus::Skipped => "skipped",
            StepStatus::Unknown => "unknown",
            StepStatus::Other(raw) => raw,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, StepStatus::Skipped)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const STEPS_KEY: &str = "steps";

/// One entry of a `steps` list.
///
/// The entry is kept as written: objects keep every key in its original
/// position and entries that are not objects pass through untouched. Only the
/// nested `steps` array is parsed, into `children`; its slot in `raw` stays as
/// a placeholder so the array is written back where it was.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    raw: Value,
    children: Option<Vec<StepRecord>>,
}

impl Default for StepRecord {
    fn default() -> Self {
        Self {
            raw: Value::Object(Map::new()),
            children: None,
        }
    }
}

impl From<Value> for StepRecord {
    fn from(mut raw: Value) -> Self {
        let children = match raw.get_mut(STEPS_KEY) {
            Some(Value::Array(items)) => Some(
                std::mem::take(items)
                    .into_iter()
                    .map(StepRecord::from)
                    .collect(),
            ),
            _ => None,
        };
        Self { raw, children }
    }
}

impl StepRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self::default().with_field("name", Value::String(name.into()))
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set_field(key, value.into());
        self
    }

    pub fn with_status(self, status: impl Into<String>) -> Self {
        self.with_field("status", Value::String(status.into()))
    }

    pub fn with_times(self, start: i64, stop: i64) -> Self {
        self.with_field("start", start).with_field("stop", stop)
    }

    pub fn with_children(mut self, children: Vec<StepRecord>) -> Self {
        self.set_children(children);
        self
    }

    /// A field as written, `None` when absent or when the entry is not an object.
    pub fn field(&self, key: &str) -> Option<&Value> {
        match key {
            STEPS_KEY => None,
            _ => self.raw.get(key),
        }
    }

    pub(crate) fn field_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.raw.get_mut(key)
    }

    /// Set a field, keeping its position when it already exists. Entries that
    /// are not objects have no fields and are left alone.
    pub fn set_field(&mut self, key: &str, value: Value) {
        if let Value::Object(fields) = &mut self.raw {
            fields.insert(key.to_string(), value);
        }
    }

    /// The step name, or an empty string when it is absent or not a string.
    pub fn name(&self) -> &str {
        self.text("name").unwrap_or_default()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.set_field("name", Value::String(name.into()));
    }

    /// The status as written, when it is a string.
    pub fn status_text(&self) -> Option<&str> {
        self.text("status")
    }

    pub fn status(&self) -> Option<StepStatus> {
        self.status_text().and_then(StepStatus::parse)
    }

    pub fn set_status(&mut self, status: &StepStatus) {
        self.set_field("status", Value::String(status.to_string()));
    }

    /// Start in milliseconds, absent when missing or unusable.
    pub fn start(&self) -> Option<i64> {
        self.field("start").and_then(coerce_millis)
    }

    /// Stop in milliseconds, absent when missing or unusable.
    pub fn stop(&self) -> Option<i64> {
        self.field("stop").and_then(coerce_millis)
    }

    /// The nested `steps` list, `None` unless the entry carries one.
    pub fn steps(&self) -> Option<&[StepRecord]> {
        self.children.as_deref()
    }

    pub fn children(&self) -> &[StepRecord] {
        self.steps().unwrap_or_default()
    }

    /// Replace the nested `steps` list, adding the key after the existing
    /// fields when the entry had none.
    pub fn set_children(&mut self, children: Vec<StepRecord>) {
        if let Value::Object(fields) = &mut self.raw {
            fields.insert(STEPS_KEY.to_string(), Value::Array(Vec::new()));
            self.children = Some(children);
        }
    }

    pub(crate) fn push_child(&mut self, child: StepRecord) {
        match &mut self.children {
            Some(children) => children.push(child),
            None => self.set_children(vec![child]),
        }
    }

    /// A step with at least one child is treated as a group.
    pub fn is_group(&self) -> bool {
        !self.children().is_empty()
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }
}

impl Serialize for StepRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (Value::Object(fields), Some(children)) = (&self.raw, &self.children) else {
            return self.raw.serialize(serializer);
        };

        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (key, value) in fields {
            if key == STEPS_KEY {
                map.serialize_entry(key, children)?;
            } else {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StepRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(StepRecord::from)
    }
}

/// Convert a raw timestamp into milliseconds.
///
/// Integers pass through, floats and numeric strings are truncated toward zero.
/// Anything else (null, booleans, empty or unparsable strings, non-finite
/// values) is absent rather than zero.
pub fn coerce_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(truncate_millis)),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            text.parse::<f64>().ok().and_then(truncate_millis)
        }
        _ => None,
    }
}

fn truncate_millis(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}
