//! Flow grouping.
//!
//! Rows whose [`MergeKey`] matches collapse into one [`FlowGroup`], which the
//! assembler later renders as a single delivery flow listing every member
//! alarm.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::engage::tools::model::FlowRow;

pub mod key;

pub use key::MergeKey;

/// How aggressively rows are merged into shared flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeMode {
    /// Every row becomes its own flow.
    #[default]
    None,
    /// Rows merge when both key and config group match.
    ByConfigGroup,
    /// Rows merge when the key matches, whatever their config group.
    AcrossConfigGroup,
}

/// Legacy boolean switch: `true` merged everything, `false` merged nothing.
impl From<bool> for MergeMode {
    fn from(merge: bool) -> Self {
        if merge {
            MergeMode::AcrossConfigGroup
        } else {
            MergeMode::None
        }
    }
}

/// Rows that share delivery behaviour and become one output flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowGroup {
    pub key: MergeKey,
    /// Member rows in source order. Never empty.
    pub rows: Vec<FlowRow>,
}

impl FlowGroup {
    fn new(key: MergeKey, row: FlowRow) -> Self {
        Self {
            key,
            rows: vec![row],
        }
    }

    /// The first member; all members agree on every keyed field.
    pub fn representative(&self) -> &FlowRow {
        &self.rows[0]
    }

    /// Distinct alarm names in first-seen order. Empty names are kept.
    pub fn alarm_names(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|row| row.alarm_name.as_str()))
    }

    /// Distinct config groups in first-seen order.
    pub fn config_groups(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|row| row.config_group.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|existing| existing == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Partitions in-scope rows into flow groups.
///
/// Rows out of scope are dropped before grouping. Groups appear in the order
/// their first member appears in `rows`.
pub fn group_rows(rows: &[FlowRow], mode: MergeMode) -> Vec<FlowGroup> {
    let mut groups: Vec<FlowGroup> = Vec::new();
    let mut index: HashMap<(MergeKey, Option<&str>), usize> = HashMap::new();

    for row in rows {
        if !row.in_scope {
            debug!(alarm = %row.alarm_name, "row out of scope, skipped");
            continue;
        }

        let key = MergeKey::of(row);
        let partition = match mode {
            MergeMode::None => {
                groups.push(FlowGroup::new(key, row.clone()));
                continue;
            }
            MergeMode::ByConfigGroup => Some(row.config_group.as_str()),
            MergeMode::AcrossConfigGroup => None,
        };

        match index.get(&(key.clone(), partition)) {
            Some(&position) => groups[position].rows.push(row.clone()),
            None => {
                index.insert((key.clone(), partition), groups.len());
                groups.push(FlowGroup::new(key, row.clone()));
            }
        }
    }

    groups
}
