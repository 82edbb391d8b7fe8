use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::{debug, info};

use crate::engage::tools::config::ConverterConfig;
use crate::engage::tools::error::Result;
use crate::engage::tools::io::headers::{
    FlowColumn, HeaderIndex, UnitColumn, find_header_row, flow_column_specs, unit_column_specs,
};
use crate::engage::tools::model::{FlowType, ParsedWorkbook, RawRow, UnitRow};
use crate::engage::tools::normalize::{clean_cell_text, normalize_row};

/// What a worksheet holds, judged from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Units,
    Flows(FlowType),
}

/// Classifies a sheet by name, case-insensitively.
pub fn classify_sheet(name: &str) -> Option<SheetKind> {
    let folded = name.trim().to_lowercase();
    if folded.contains("unit breakdown") {
        Some(SheetKind::Units)
    } else if folded.contains("nurse call") {
        Some(SheetKind::Flows(FlowType::NurseCalls))
    } else if folded.contains("patient monitoring") || folded.contains("clinical") {
        Some(SheetKind::Flows(FlowType::Clinicals))
    } else if folded.contains("order") {
        Some(SheetKind::Flows(FlowType::Orders))
    } else {
        None
    }
}

/// Reads the unit table and every alarm-rule sheet of a workbook.
///
/// Sheets are picked by name, then each configured custom tab is added;
/// custom tabs missing from the workbook are skipped.
pub fn read_workbook(path: &Path, config: &ConverterConfig) -> Result<ParsedWorkbook> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let mut plan: Vec<(String, SheetKind)> = sheet_names
        .iter()
        .filter_map(|name| classify_sheet(name).map(|kind| (name.clone(), kind)))
        .collect();

    for tab in &config.custom_tabs {
        let Some(name) = sheet_names
            .iter()
            .find(|name| name.trim().eq_ignore_ascii_case(tab.sheet.trim()))
        else {
            debug!(sheet = %tab.sheet, "custom tab not present in workbook, skipped");
            continue;
        };
        let kind = SheetKind::Flows(tab.flow_type);
        if !plan.iter().any(|(planned, _)| planned == name) {
            plan.push((name.clone(), kind));
        }
    }

    let mut parsed = ParsedWorkbook::default();
    for (name, kind) in plan {
        let Some(rows) = read_sheet(&mut workbook, &name)? else {
            continue;
        };
        match kind {
            SheetKind::Units => parsed.units.extend(parse_unit_sheet(&rows, config)),
            SheetKind::Flows(flow_type) => {
                let raws = parse_flow_sheet(&rows, config);
                debug!(sheet = %name, %flow_type, rows = raws.len(), "read alarm rows");
                let defaults = config.default_interfaces.enabled();
                parsed
                    .rows_mut(flow_type)
                    .extend(raws.iter().map(|raw| normalize_row(raw, &defaults)));
            }
        }
    }

    info!(
        units = parsed.units.len(),
        rows = parsed.row_count(),
        "workbook loaded"
    );
    Ok(parsed)
}

fn read_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Option<Vec<Vec<String>>>> {
    let Some(range) = workbook.worksheet_range(name) else {
        return Ok(None);
    };
    let range = range?;
    let rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
        .collect();
    Ok(Some(rows))
}

/// Reads the alarm rows below the header row. Spacer rows and rows without an
/// alarm name are dropped.
pub fn parse_flow_sheet(rows: &[Vec<String>], config: &ConverterConfig) -> Vec<RawRow> {
    let specs = flow_column_specs();
    let is_header = |cell: &str| {
        specs.iter().any(|(column, spec)| {
            matches!(column, FlowColumn::AlarmName | FlowColumn::ConfigGroup) && spec.matches(cell)
        })
    };
    let Some(header_row) = find_header_row(rows, config.header_scan_rows, is_header) else {
        debug!("no header row found, sheet skipped");
        return Vec::new();
    };
    let index = HeaderIndex::build(&rows[header_row], &specs);

    let mut raws = Vec::new();
    for row in &rows[header_row + 1..] {
        let raw = RawRow {
            config_group: index.value(FlowColumn::ConfigGroup, row),
            alarm_name: index.value(FlowColumn::AlarmName, row),
            sending_name: index.value(FlowColumn::SendingName, row),
            priority: index.value(FlowColumn::Priority, row),
            device_a: index.value(FlowColumn::DeviceA, row),
            device_b: index.value(FlowColumn::DeviceB, row),
            ringtone: index.value(FlowColumn::Ringtone, row),
            response_options: index.value(FlowColumn::ResponseOptions, row),
            break_through_dnd: index.value(FlowColumn::BreakThroughDnd, row),
            enunciate: index.value(FlowColumn::Enunciate, row),
            escalate_after: index.value(FlowColumn::EscalateAfter, row),
            recipients: std::array::from_fn(|slot| index.value(FlowColumn::Recipient(slot), row)),
            timings: std::array::from_fn(|slot| index.value(FlowColumn::Timing(slot), row)),
            in_scope: index.value(FlowColumn::InScope, row),
            pod_filter: index.value(FlowColumn::PodFilter, row),
            room_filter: index.value(FlowColumn::RoomFilter, row),
        };
        if raw.is_blank() {
            continue;
        }
        if raw.alarm_name.is_empty() {
            debug!(config_group = %raw.config_group, "row without alarm name skipped");
            continue;
        }
        raws.push(raw);
    }
    raws
}

/// Reads the unit breakdown table. Rows without a unit name are dropped.
pub fn parse_unit_sheet(rows: &[Vec<String>], config: &ConverterConfig) -> Vec<UnitRow> {
    let specs = unit_column_specs();
    let is_header = |cell: &str| {
        specs
            .iter()
            .any(|(column, spec)| *column == UnitColumn::UnitName && spec.matches(cell))
    };
    let Some(header_row) = find_header_row(rows, config.header_scan_rows, is_header) else {
        debug!("unit breakdown has no header row");
        return Vec::new();
    };
    let index = HeaderIndex::build(&rows[header_row], &specs);

    rows[header_row + 1..]
        .iter()
        .map(|row| UnitRow {
            facility: index.value(UnitColumn::Facility, row),
            name: index.value(UnitColumn::UnitName, row),
            nurse_call_group: index.value(UnitColumn::NurseCallGroup, row),
            clinical_group: index.value(UnitColumn::ClinicalGroup, row),
            orders_group: index.value(UnitColumn::OrdersGroup, row),
            no_caregiver_group: index.value(UnitColumn::NoCaregiverGroup, row),
        })
        .filter(|unit| !unit.name.is_empty())
        .collect()
}

/// Cell text as presented to the pipeline. Formula errors read as empty;
/// formulas are represented by their cached result.
fn cell_to_string(cell: Option<&DataType>) -> String {
    let text = match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Error(_)) | Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    };
    clean_cell_text(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engage::tools::model::RECIPIENT_SLOTS;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn classifies_sheets_by_name() {
        assert_eq!(classify_sheet("Unit Breakdown"), Some(SheetKind::Units));
        assert_eq!(
            classify_sheet("Nurse Call"),
            Some(SheetKind::Flows(FlowType::NurseCalls))
        );
        assert_eq!(
            classify_sheet("PATIENT MONITORING"),
            Some(SheetKind::Flows(FlowType::Clinicals))
        );
        assert_eq!(
            classify_sheet("Orders"),
            Some(SheetKind::Flows(FlowType::Orders))
        );
        assert_eq!(classify_sheet("Instructions"), None);
    }

    #[test]
    fn flow_rows_skip_spacers_and_unnamed_alarms() {
        let rows = vec![
            strings(&[
                "Configuration Group",
                "Common Alert or Alarm Name",
                "Priority",
                "1st Recipient",
            ]),
            strings(&["4W NC", "Code Blue", "Urgent", "VGroup: Code Team"]),
            strings(&["", "", "", ""]),
            strings(&["4W NC", "", "High", "RN"]),
            strings(&["4W NC", "Staff Assist", "High"]),
        ];
        let raws = parse_flow_sheet(&rows, &ConverterConfig::default());

        assert_eq!(raws.len(), 2);
        assert_eq!(raws[0].alarm_name, "Code Blue");
        assert_eq!(raws[0].recipients[0], "VGroup: Code Team");
        assert_eq!(raws[1].alarm_name, "Staff Assist");
        assert_eq!(raws[1].recipients[0], "");
        assert_eq!(raws[1].recipients.len(), RECIPIENT_SLOTS);
    }

    #[test]
    fn unit_rows_use_header_aliases() {
        let rows = vec![
            strings(&["Unit Breakdown"]),
            strings(&[
                "Facility",
                "Common Unit Name",
                "Nurse Call Configuration Group",
                "Patient Monitoring Configuration Group",
                "Orders Configuration Group",
                "No Caregiver Alert Number or Group",
            ]),
            strings(&["General", "4 West", "4W NC", "4W PM", "4W OR", "4W Charge"]),
            strings(&["General", "", "", "", "", ""]),
        ];
        let units = parse_unit_sheet(&rows, &ConverterConfig::default());

        assert_eq!(
            units,
            vec![UnitRow {
                facility: "General".into(),
                name: "4 West".into(),
                nurse_call_group: "4W NC".into(),
                clinical_group: "4W PM".into(),
                orders_group: "4W OR".into(),
                no_caregiver_group: "4W Charge".into(),
            }]
        );
    }

    #[test]
    fn formula_errors_read_as_empty() {
        let error = DataType::Error(calamine::CellErrorType::NA);
        assert_eq!(cell_to_string(Some(&error)), "");
        assert_eq!(cell_to_string(Some(&DataType::Float(60.0))), "60");
        assert_eq!(cell_to_string(Some(&DataType::String("#REF!".into()))), "");
    }
}
