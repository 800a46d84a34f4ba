//! Business step grouping
//!
//! Reporters record business steps as ordinary steps named
//! `* business step '<label>'` followed by the steps that implement them.
//! [`GroupingEngine::partition`] turns each such marker into a parent holding
//! the steps after it, and [`aggregate`] derives every parent's status and
//! time bounds from its children.

use crate::step::{StepRecord, StepStatus};

/// Marker prefix written by the step definitions, matched case-insensitively.
pub const DEFAULT_MARKER_PREFIX: &str = "* business step";

/// Where the partition scan currently appends non-marker steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// No marker seen yet; steps stay at the top level.
    Ungrouped,
    /// Steps go into the last top-level entry, the most recent parent.
    InGroup,
}

/// Earliest start and latest stop derived from a group's children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeBounds {
    pub start: Option<i64>,
    pub stop: Option<i64>,
}

/// A step sequence after grouping, remembering which top-level entries are
/// business step parents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedSteps {
    pub steps: Vec<StepRecord>,
    parents: Vec<usize>,
}

impl GroupedSteps {
    /// Treat an already grouped sequence as-is: every top-level entry with
    /// children is a parent.
    pub fn from_prepared(steps: Vec<StepRecord>) -> Self {
        let parents = steps
            .iter()
            .enumerate()
            .filter(|(_, step)| step.is_group())
            .map(|(index, _)| index)
            .collect();
        Self { steps, parents }
    }

    /// Fall back to [`GroupedSteps::from_prepared`] when no marker opened a group.
    pub fn or_prepared(self) -> Self {
        if self.parents.is_empty() {
            Self::from_prepared(self.steps)
        } else {
            self
        }
    }

    pub fn parents(&self) -> impl Iterator<Item = &StepRecord> {
        self.parents.iter().filter_map(|&index| self.steps.get(index))
    }

    pub fn parent_count(&self) -> usize {
        self.parents.len()
    }

    pub fn into_steps(self) -> Vec<StepRecord> {
        self.steps
    }
}

#[derive(Debug, Clone)]
pub struct GroupingEngine {
    marker_prefix: String,
}

impl Default for GroupingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_PREFIX)
    }
}

impl GroupingEngine {
    pub fn new(marker_prefix: impl Into<String>) -> Self {
        Self {
            marker_prefix: marker_prefix.into().to_lowercase(),
        }
    }

    pub fn marker_prefix(&self) -> &str {
        &self.marker_prefix
    }

    /// The group label if `name` is a marker, `None` otherwise.
    ///
    /// The remainder after the prefix is trimmed and one pair of matching
    /// quotes is removed. An empty label is still a label.
    pub fn group_label(&self, name: &str) -> Option<String> {
        let name = name.trim();
        let head = name.get(..self.marker_prefix.len())?;
        if head.to_lowercase() != self.marker_prefix {
            return None;
        }
        let remainder = name[self.marker_prefix.len()..].trim();
        Some(strip_matching_quotes(remainder).to_string())
    }

    pub fn is_marker(&self, step: &StepRecord) -> bool {
        self.group_label(step.name()).is_some()
    }

    /// Split a flat step sequence into parents and their children.
    ///
    /// Each marker closes the previous group and opens a new top-level
    /// parent; markers never nest. Steps before the first marker stay at the
    /// top level. The input is not modified.
    pub fn partition(&self, steps: &[StepRecord]) -> Vec<StepRecord> {
        self.partition_indexed(steps).0
    }

    /// Partition and aggregate in one go.
    pub fn group(&self, steps: &[StepRecord]) -> GroupedSteps {
        let (mut grouped, parents) = self.partition_indexed(steps);
        aggregate(&mut grouped);
        GroupedSteps {
            steps: grouped,
            parents,
        }
    }

    /// Groups for display: grouped from scratch when markers are still
    /// present, otherwise taken from an already prepared sequence.
    pub fn resolve_groups(&self, steps: &[StepRecord]) -> GroupedSteps {
        self.group(steps).or_prepared()
    }

    fn partition_indexed(&self, steps: &[StepRecord]) -> (Vec<StepRecord>, Vec<usize>) {
        let mut grouped: Vec<StepRecord> = Vec::with_capacity(steps.len());
        let mut parents = Vec::new();
        let mut state = ScanState::Ungrouped;

        for step in steps {
            if let Some(label) = self.group_label(step.name()) {
                let mut parent = step.clone();
                parent.set_name(label);
                parent.set_children(Vec::new());
                parents.push(grouped.len());
                grouped.push(parent);
                state = ScanState::InGroup;
                continue;
            }

            match (state, grouped.last_mut()) {
                (ScanState::InGroup, Some(parent)) => parent.push_child(step.clone()),
                _ => grouped.push(step.clone()),
            }
        }

        (grouped, parents)
    }
}

fn strip_matching_quotes(text: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

/// Worst child status by [`StepStatus::PRIORITY`].
///
/// Falls back to the first non-empty status outside the vocabulary, and to
/// `None` when no child carries a status.
pub fn aggregate_status(children: &[StepRecord]) -> Option<StepStatus> {
    let statuses: Vec<StepStatus> = children.iter().filter_map(StepRecord::status).collect();
    StepStatus::PRIORITY
        .iter()
        .find(|candidate| statuses.contains(*candidate))
        .cloned()
        .or_else(|| statuses.into_iter().next())
}

/// Earliest child start, and latest stop among executed (non-skipped)
/// children, falling back to the latest stop of any child.
pub fn aggregate_time_bounds(children: &[StepRecord]) -> TimeBounds {
    let start = children.iter().filter_map(StepRecord::start).min();

    let executed_stop = children
        .iter()
        .filter(|child| !child.status().is_some_and(|status| status.is_skipped()))
        .filter_map(StepRecord::stop)
        .max();
    let stop = executed_stop.or_else(|| children.iter().filter_map(StepRecord::stop).max());

    TimeBounds { start, stop }
}

/// Recompute status, start and stop of every top-level entry that has
/// children. Values that cannot be derived are left as they were, and the
/// children themselves are never touched.
pub fn aggregate(steps: &mut [StepRecord]) {
    for step in steps.iter_mut().filter(|step| step.is_group()) {
        let status = aggregate_status(step.children());
        let bounds = aggregate_time_bounds(step.children());

        if let Some(status) = status {
            step.set_status(&status);
        }
        if let Some(start) = bounds.start {
            step.set_field("start", start.into());
        }
        if let Some(stop) = bounds.stop {
            step.set_field("stop", stop.into());
        }
    }
}
