#![allow(dead_code)]

use std::path::Path;

use rust_xlsxwriter::Workbook;
use serde_json::Value;

pub const NURSE_CALL_HEADERS: [&str; 16] = [
    "In Scope?",
    "Configuration Group",
    "Common Alert or Alarm Name",
    "Sending System Alert Name",
    "Priority",
    "Device - A",
    "Device-B",
    "Ringtone Device - A",
    "Response Options",
    "Break Through DND",
    "Engage 6.6+: Use Enunciation?",
    "Escalate after",
    "Time to 1st Recipient",
    "1st Recipient",
    "Time to 2nd Recipient",
    "2nd Recipient",
];

pub const UNIT_HEADERS: [&str; 6] = [
    "Facility",
    "Common Unit Name",
    "Nurse Call Configuration Group",
    "Patient Monitoring Configuration Group",
    "Orders Configuration Group",
    "No Caregiver Alert Number or Group",
];

/// One worksheet of a fixture workbook.
pub struct Sheet<'a> {
    pub name: &'a str,
    /// Title rows written above the header row.
    pub preamble: Vec<&'a str>,
    pub headers: Vec<&'a str>,
    pub rows: Vec<Vec<&'a str>>,
}

impl<'a> Sheet<'a> {
    pub fn new(name: &'a str, headers: &[&'a str], rows: Vec<Vec<&'a str>>) -> Self {
        Self {
            name,
            preamble: Vec::new(),
            headers: headers.to_vec(),
            rows,
        }
    }
}

/// Writes a fixture workbook. Purely numeric cells are stored as numbers.
pub fn write_fixture(path: &Path, sheets: &[Sheet]) {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name).expect("sheet name");

        let mut row_index = 0u32;
        for title in &sheet.preamble {
            worksheet.write_string(row_index, 0, *title).expect("title written");
            row_index += 1;
        }
        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet
                .write_string(row_index, col as u16, *header)
                .expect("header written");
        }
        for row in &sheet.rows {
            row_index += 1;
            for (col, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                match cell.parse::<f64>() {
                    Ok(number) => worksheet.write_number(row_index, col as u16, number),
                    Err(_) => worksheet.write_string(row_index, col as u16, *cell),
                }
                .expect("cell written");
            }
        }
    }
    workbook.save(path).expect("fixture saved");
}

pub fn units_sheet<'a>() -> Sheet<'a> {
    Sheet::new(
        "Unit Breakdown",
        &UNIT_HEADERS,
        vec![
            vec!["General", "4 West", "4W NC", "4W PM", "", "4W Charge"],
            vec!["General", "5 East", "5E NC", "", "", ""],
        ],
    )
}

/// A nurse-call row with the given alarm, config group, device and DND.
pub fn nurse_row<'a>(
    alarm: &'a str,
    config_group: &'a str,
    device_a: &'a str,
    dnd: &'a str,
) -> Vec<&'a str> {
    vec![
        "Yes",
        config_group,
        alarm,
        "",
        "High",
        device_a,
        "",
        "list_pagers",
        "Accept, Escalate",
        dnd,
        "Yes",
        "",
        "",
        "VAssign:[Room] RN",
        "60",
        "VGroup: Charge Nurses",
    ]
}

pub fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path).expect("document read");
    serde_json::from_str(&text).expect("document parsed")
}

pub fn flows(document: &Value) -> &Vec<Value> {
    document["deliveryFlows"].as_array().expect("deliveryFlows array")
}

pub fn parameter<'a>(flow: &'a Value, name: &str) -> Option<&'a str> {
    flow["parameterAttributes"]
        .as_array()?
        .iter()
        .find(|attribute| attribute["name"] == name)
        .and_then(|attribute| attribute["value"].as_str())
}
