use std::path::Path;

use rust_xlsxwriter::{Table, Workbook};

use crate::engage::tools::assemble::recipients::ordinal;
use crate::engage::tools::error::Result;
use crate::engage::tools::model::{FlowRow, FlowType, ParsedWorkbook, RECIPIENT_SLOTS};

/// Sheet name of the exported unit table.
pub const UNITS_SHEET: &str = "Unit Breakdown";

const UNIT_COLUMNS: [&str; 6] = [
    "Facility",
    "Common Unit Name",
    "Nurse Call Configuration Group",
    "Patient Monitoring Configuration Group",
    "Orders Configuration Group",
    "No Caregiver Alert Number or Group",
];

/// A table that will be materialised as an Excel sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Represents all tables required to materialise the Excel workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

/// Lays the parsed rows out with canonical sheet names and headers, so that
/// [`read_workbook`](crate::io::excel_read::read_workbook) reads them back.
/// Flow types without rows get no sheet.
pub fn build_workbook(parsed: &ParsedWorkbook) -> WorkbookData {
    let mut tables = vec![SheetTable {
        sheet_name: UNITS_SHEET.to_string(),
        columns: UNIT_COLUMNS.iter().map(|column| column.to_string()).collect(),
        rows: parsed
            .units
            .iter()
            .map(|unit| {
                vec![
                    unit.facility.clone(),
                    unit.name.clone(),
                    unit.nurse_call_group.clone(),
                    unit.clinical_group.clone(),
                    unit.orders_group.clone(),
                    unit.no_caregiver_group.clone(),
                ]
            })
            .collect(),
    }];

    for flow_type in FlowType::ALL {
        let rows = parsed.rows(flow_type);
        if rows.is_empty() {
            continue;
        }
        tables.push(SheetTable {
            sheet_name: flow_type.sheet_name().to_string(),
            columns: flow_columns(),
            rows: rows.iter().map(flow_cells).collect(),
        });
    }

    WorkbookData { tables }
}

fn flow_columns() -> Vec<String> {
    let mut columns: Vec<String> = [
        "In Scope?",
        "Configuration Group",
        "Common Alert or Alarm Name",
        "Sending System Alert Name",
        "Priority",
        "Device - A",
        "Device - B",
        "Ringtone Device - A",
        "Response Options",
        "Break Through DND",
        "Engage 6.6+: Use Enunciation?",
        "Escalate after",
    ]
    .iter()
    .map(|column| column.to_string())
    .collect();

    for slot in 0..RECIPIENT_SLOTS {
        let position = ordinal(slot + 1);
        columns.push(format!("Time to {position} Recipient"));
        columns.push(format!("{position} Recipient"));
    }
    columns.push("POD Room Filter".to_string());
    columns.push("Room Filter".to_string());
    columns
}

fn yes_no(value: bool) -> String {
    let text = if value { "Yes" } else { "No" };
    text.to_string()
}

fn flow_cells(row: &FlowRow) -> Vec<String> {
    let priority = if row.priority_raw.is_empty() {
        row.priority.display_name().to_string()
    } else {
        row.priority_raw.clone()
    };

    let mut cells = vec![
        yes_no(row.in_scope),
        row.config_group.clone(),
        row.alarm_name.clone(),
        row.sending_name.clone(),
        priority,
        row.device_a.clone(),
        row.device_b.clone(),
        row.ringtone.clone(),
        row.response_options.clone(),
        row.break_through_dnd.clone(),
        yes_no(row.enunciate),
        row.escalate_after.clone(),
    ];
    for slot in 0..RECIPIENT_SLOTS {
        cells.push(row.timings[slot].clone());
        cells.push(row.recipients[slot].clone());
    }
    cells.push(row.pod_filter.clone());
    cells.push(row.room_filter.clone());
    cells
}

/// Writes the provided workbook data to the given path.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    let mut workbook_writer = Workbook::new();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                worksheet.write_string((row_idx + 1) as u32, col_idx as u16, cell)?;
            }
        }

        if table.rows.is_empty() {
            continue;
        }
        let mut excel_table = Table::new();
        excel_table.set_autofilter(true);
        let col_end = (table.columns.len() as u16).saturating_sub(1);
        worksheet.add_table(0, 0, table.rows.len() as u32, col_end, &excel_table)?;
    }

    workbook_writer.save(path)?;
    Ok(())
}
