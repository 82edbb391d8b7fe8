//! Fuzzy header resolution.
//!
//! Real workbooks name the same column in many ways ("Device - A",
//! "Device A", "Device-A"). Each logical column is described by substrings
//! that must appear in the folded header and substrings that must not.

use crate::engage::tools::assemble::recipients::ordinal;
use crate::engage::tools::model::RECIPIENT_SLOTS;

/// Logical columns of an alarm-rule sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowColumn {
    ConfigGroup,
    AlarmName,
    SendingName,
    Priority,
    DeviceA,
    DeviceB,
    Ringtone,
    ResponseOptions,
    BreakThroughDnd,
    Enunciate,
    EscalateAfter,
    /// "Time to Nth Recipient", zero-based slot.
    Timing(usize),
    /// "Nth Recipient", zero-based slot.
    Recipient(usize),
    InScope,
    PodFilter,
    RoomFilter,
}

/// Logical columns of the unit breakdown sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitColumn {
    Facility,
    UnitName,
    NurseCallGroup,
    ClinicalGroup,
    OrdersGroup,
    NoCaregiverGroup,
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    includes: Vec<String>,
    excludes: Vec<&'static str>,
}

impl ColumnSpec {
    fn new(includes: &[&str], excludes: &[&'static str]) -> Self {
        Self {
            includes: includes.iter().map(|alias| alias.to_string()).collect(),
            excludes: excludes.to_vec(),
        }
    }

    /// True when the header names this column.
    pub fn matches(&self, header: &str) -> bool {
        let folded = fold_header(header);
        !folded.is_empty()
            && self.includes.iter().any(|alias| folded.contains(alias.as_str()))
            && !self.excludes.iter().any(|exclude| folded.contains(exclude))
    }
}

/// Lower-cases and collapses runs of whitespace.
fn fold_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn flow_column_specs() -> Vec<(FlowColumn, ColumnSpec)> {
    let mut specs = vec![
        (
            FlowColumn::ConfigGroup,
            ColumnSpec::new(&["configuration group", "config group"], &[]),
        ),
        (
            FlowColumn::AlarmName,
            ColumnSpec::new(
                &["common alert or alarm name", "alarm name", "alert name"],
                &["sending"],
            ),
        ),
        (
            FlowColumn::SendingName,
            ColumnSpec::new(&["sending system", "sending name"], &[]),
        ),
        (FlowColumn::Priority, ColumnSpec::new(&["priority"], &[])),
        (
            FlowColumn::DeviceA,
            ColumnSpec::new(&["device - a", "device a", "device-a"], &["ringtone"]),
        ),
        (
            FlowColumn::DeviceB,
            ColumnSpec::new(&["device - b", "device b", "device-b"], &["ringtone"]),
        ),
        (
            FlowColumn::Ringtone,
            ColumnSpec::new(&["ringtone", "alert sound"], &[]),
        ),
        (
            FlowColumn::ResponseOptions,
            ColumnSpec::new(&["response options", "response"], &[]),
        ),
        (
            FlowColumn::BreakThroughDnd,
            ColumnSpec::new(&["break through dnd", "breakthrough dnd", "dnd"], &[]),
        ),
        (FlowColumn::Enunciate, ColumnSpec::new(&["enunciat"], &[])),
        (
            FlowColumn::EscalateAfter,
            ColumnSpec::new(&["escalate after"], &[]),
        ),
        (FlowColumn::InScope, ColumnSpec::new(&["in scope"], &[])),
        (FlowColumn::PodFilter, ColumnSpec::new(&["pod"], &[])),
        (
            FlowColumn::RoomFilter,
            ColumnSpec::new(&["room filter", "room number"], &["pod"]),
        ),
    ];

    for slot in 0..RECIPIENT_SLOTS {
        let recipient = format!("{} recipient", ordinal(slot + 1).to_lowercase());
        specs.push((
            FlowColumn::Timing(slot),
            ColumnSpec {
                includes: vec![format!("time to {recipient}"), format!("{recipient} delay")],
                excludes: Vec::new(),
            },
        ));
        specs.push((
            FlowColumn::Recipient(slot),
            ColumnSpec {
                includes: vec![recipient],
                excludes: vec!["time", "delay"],
            },
        ));
    }

    specs
}

pub fn unit_column_specs() -> Vec<(UnitColumn, ColumnSpec)> {
    vec![
        (UnitColumn::Facility, ColumnSpec::new(&["facility"], &[])),
        (
            UnitColumn::UnitName,
            ColumnSpec::new(&["common unit name", "unit name"], &[]),
        ),
        (
            UnitColumn::NurseCallGroup,
            ColumnSpec::new(&["nurse call"], &[]),
        ),
        (
            UnitColumn::ClinicalGroup,
            ColumnSpec::new(&["patient monitoring", "clinical"], &[]),
        ),
        (UnitColumn::OrdersGroup, ColumnSpec::new(&["order"], &[])),
        (
            UnitColumn::NoCaregiverGroup,
            ColumnSpec::new(&["no caregiver"], &[]),
        ),
    ]
}

/// Maps each logical column to every matching sheet column, in sheet order.
#[derive(Debug, Clone)]
pub struct HeaderIndex<K> {
    matches: Vec<(K, Vec<usize>)>,
}

impl<K: Copy + PartialEq> HeaderIndex<K> {
    pub fn build(headers: &[String], specs: &[(K, ColumnSpec)]) -> Self {
        let matches = specs
            .iter()
            .map(|(key, spec)| {
                let columns = headers
                    .iter()
                    .enumerate()
                    .filter(|(_, header)| spec.matches(header))
                    .map(|(index, _)| index)
                    .collect();
                (*key, columns)
            })
            .collect();
        Self { matches }
    }

    fn columns(&self, key: K) -> Option<&[usize]> {
        self.matches
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, columns)| columns.as_slice())
    }

    /// Value of the first matching column that is non-empty in `row`.
    pub fn value(&self, key: K, row: &[String]) -> String {
        self.columns(key)
            .unwrap_or_default()
            .iter()
            .filter_map(|index| row.get(*index))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

/// Index of the first row, among the first `limit`, that `is_header` accepts.
pub fn find_header_row(
    rows: &[Vec<String>],
    limit: usize,
    is_header: impl Fn(&str) -> bool,
) -> Option<usize> {
    rows.iter()
        .take(limit.max(1))
        .position(|row| row.iter().any(|cell| is_header(cell)))
}
