mod common;

use std::fs;

use common::{NURSE_CALL_HEADERS, Sheet, flows, nurse_row, read_json, units_sheet, write_fixture};
use engage_tools::config::ConverterConfig;
use engage_tools::io::{excel_read, xml_read};
use engage_tools::merge::MergeMode;
use engage_tools::model::{ParsedWorkbook, Priority};
use engage_tools::{ToolError, sync};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const PACKAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package>
  <contents>
    <datasets>
      <dataset active="true">
        <name>Clinicals</name>
        <view>
          <name>Low SpO2 5E</name>
          <filter relation="equal">
            <path>alarm_name</path>
            <value>SpO2 Low</value>
          </filter>
          <filter relation="equal">
            <path>bed.room.unit.name</path>
            <value>5 East</value>
          </filter>
        </view>
      </dataset>
    </datasets>
    <interfaces>
      <interface component="XMPP">
        <rule active="true" dataset="Clinicals">
          <defer-delivery-by>0</defer-delivery-by>
          <condition><view>Low SpO2 5E</view></condition>
          <settings>{"priority": "1", "groups": ["Telemetry"]}</settings>
        </rule>
      </interface>
    </interfaces>
  </contents>
</package>"#;

#[test]
fn exported_workbook_reads_back_the_same_rows() {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("alarms.xlsx");
    let mut quiet = nurse_row("Bed Exit", "4W NC", "Vocera VCS", "none");
    quiet[10] = "No";
    write_fixture(
        &xlsx_path,
        &[
            units_sheet(),
            Sheet::new(
                "Nurse Call",
                &NURSE_CALL_HEADERS,
                vec![nurse_row("Code Blue", "4W NC", "Vocera VCS", "Yes"), quiet],
            ),
        ],
    );

    let out_dir = temp_dir.path().join("out");
    let config = ConverterConfig::default();
    sync::excel_to_json(&xlsx_path, &out_dir, &config).expect("first conversion");

    let exported = temp_dir.path().join("exported.xlsx");
    sync::json_to_excel(&out_dir.join("nurseCalls.json"), &exported).expect("export");

    let original = excel_read::read_workbook(&xlsx_path, &config).expect("original read");
    let recovered = excel_read::read_workbook(&exported, &config).expect("export read");
    assert_eq!(recovered.nurse_calls.len(), original.nurse_calls.len());

    for (before, after) in original.nurse_calls.iter().zip(&recovered.nurse_calls) {
        assert_eq!(after.alarm_name, before.alarm_name);
        assert_eq!(after.config_group, before.config_group);
        assert_eq!(after.priority, before.priority);
        assert_eq!(after.device_a, "Vocera VCS");
        assert_eq!(after.recipients, before.recipients);
        assert_eq!(after.break_through_dnd, before.break_through_dnd);
        assert_eq!(after.enunciate, before.enunciate);
    }
    assert_eq!(recovered.nurse_calls[0].break_through_dnd, "voceraAndDevice");
    assert!(!recovered.nurse_calls[1].enunciate);
    assert_eq!(recovered.units[0].name, "4 West");
    assert_eq!(recovered.units[0].nurse_call_group, "4W NC");

    let out_again = temp_dir.path().join("again");
    sync::excel_to_json(&exported, &out_again, &config).expect("second conversion");
    let first = read_json(&out_dir.join("nurseCalls.json"));
    let second = read_json(&out_again.join("nurseCalls.json"));
    assert_eq!(flows(&second), flows(&first));
}

/// Writes `rows` to a workbook, converts it to JSON, exports the nurse-call
/// document back to a workbook, and returns the rows read from both workbooks.
fn round_trip(
    rows: Vec<Vec<&str>>,
    config: &ConverterConfig,
) -> (ParsedWorkbook, ParsedWorkbook) {
    let temp_dir = tempdir().expect("temporary directory");
    let xlsx_path = temp_dir.path().join("alarms.xlsx");
    write_fixture(
        &xlsx_path,
        &[units_sheet(), Sheet::new("Nurse Call", &NURSE_CALL_HEADERS, rows)],
    );

    let out_dir = temp_dir.path().join("out");
    sync::excel_to_json(&xlsx_path, &out_dir, config).expect("conversion");
    let exported = temp_dir.path().join("exported.xlsx");
    sync::json_to_excel(&out_dir.join("nurseCalls.json"), &exported).expect("export");

    let original = excel_read::read_workbook(&xlsx_path, config).expect("original read");
    let recovered = excel_read::read_workbook(&exported, config).expect("export read");
    (original, recovered)
}

fn delivery_fields(parsed: &ParsedWorkbook) -> Vec<(String, Priority, String, bool)> {
    parsed
        .nurse_calls
        .iter()
        .map(|row| {
            (
                row.alarm_name.clone(),
                row.priority,
                row.break_through_dnd.clone(),
                row.enunciate,
            )
        })
        .collect()
}

#[test]
fn edge_rows_keep_dnd_and_enunciate() {
    let mut row = nurse_row("Bed Exit", "4W NC", "iPhone-Edge", "none");
    row[10] = "No";
    let (original, recovered) = round_trip(vec![row], &ConverterConfig::default());

    assert_eq!(delivery_fields(&recovered), delivery_fields(&original));
    assert_eq!(
        delivery_fields(&recovered),
        vec![("Bed Exit".to_string(), Priority::High, "none".to_string(), false)]
    );
    assert_eq!(recovered.nurse_calls[0].device_a, "iPhone-Edge");
    assert_eq!(recovered.nurse_calls[0].recipients, original.nurse_calls[0].recipients);
}

#[test]
fn rows_without_a_device_keep_dnd_and_enunciate() {
    let mut row = nurse_row("Bed Exit", "4W NC", "", "none");
    row[4] = "Urgent";
    row[10] = "No";
    let (original, recovered) = round_trip(vec![row], &ConverterConfig::default());

    assert_eq!(
        delivery_fields(&recovered),
        vec![("Bed Exit".to_string(), Priority::Urgent, "none".to_string(), false)]
    );
    assert_eq!(delivery_fields(&recovered), delivery_fields(&original));
    assert_eq!(recovered.nurse_calls[0].device_a, "");
}

#[test]
fn across_merged_flows_export_every_alarm() {
    let config = ConverterConfig {
        merge_mode: MergeMode::AcrossConfigGroup,
        ..ConverterConfig::default()
    };
    let (original, recovered) = round_trip(
        vec![
            nurse_row("Alarm 1", "4W NC", "Vocera VCS", "none"),
            nurse_row("Alarm 2", "5E NC", "Vocera VCS", "none"),
        ],
        &config,
    );

    assert_eq!(delivery_fields(&recovered), delivery_fields(&original));
    for (before, after) in original.nurse_calls.iter().zip(&recovered.nurse_calls) {
        assert_eq!(after.recipients, before.recipients);
        assert_eq!(after.timings, before.timings);
        assert_eq!(after.config_group, "4W NC");
    }
    let unit_names: Vec<&str> = recovered.units.iter().map(|unit| unit.name.as_str()).collect();
    assert_eq!(unit_names, vec!["4 West", "5 East"]);
}

#[test]
fn rule_package_converts_to_clinical_flows() {
    let temp_dir = tempdir().expect("temporary directory");
    let package_path = temp_dir.path().join("package.xml");
    fs::write(&package_path, PACKAGE).expect("package written");

    let out_dir = temp_dir.path().join("out");
    let written = sync::xml_to_json(&package_path, &out_dir, &ConverterConfig::default())
        .expect("conversion");
    assert_eq!(written.len(), 3);

    let document = read_json(&out_dir.join("clinicals.json"));
    let flow = &flows(&document)[0];
    assert_eq!(flow["alarmsAlerts"], serde_json::json!(["SpO2 Low"]));
    assert_eq!(flow["interfaces"][0]["componentName"], "XMPP");
    assert_eq!(flow["destinations"][0]["groups"][0]["name"], "Telemetry");
    assert_eq!(flow["units"][0]["name"], "5 East");

    let parsed = xml_read::read_package(&package_path, &ConverterConfig::default())
        .expect("package read");
    assert_eq!(parsed.clinicals[0].priority, Priority::High);
    assert_eq!(parsed.clinicals[0].config_group, "5 East_Clinicals");
}

#[test]
fn document_without_flows_is_rejected() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("nurseCalls.json");
    fs::write(&input, r#"{"version": "1.1.0", "alarmAlertDefinitions": []}"#).expect("written");

    let error = sync::json_to_excel(&input, &temp_dir.path().join("out.xlsx")).unwrap_err();
    assert!(matches!(error, ToolError::InvalidDocument(_)));
}

#[test]
fn corrupt_workbook_is_an_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("broken.xlsx");
    fs::write(&input, b"not a zip archive").expect("written");

    let result = sync::excel_to_json(
        &input,
        &temp_dir.path().join("out"),
        &ConverterConfig::default(),
    );
    assert!(matches!(result, Err(ToolError::ExcelRead(_))));
}
