use std::fs;
use std::path::Path;

use tracing::debug;

use crate::engage::tools::assemble::{
    LIST_SEPARATOR, NAME_SEPARATOR, interface_kinds, recipient_of,
};
use crate::engage::tools::error::{Result, ToolError};
use crate::engage::tools::model::{
    DeliveryFlow, DeliveryFlowDocument, FlowRow, FlowType, ParsedWorkbook, RECIPIENT_SLOTS,
    ResponseType, UnitRow,
};
use crate::engage::tools::normalize::{PriorityTable, map_priority, parse_bool_like};

/// Pretty-prints a delivery-flow document to `path`.
pub fn write_document(path: &Path, document: &DeliveryFlowDocument) -> Result<()> {
    let json_string = serde_json::to_string_pretty(document)?;
    fs::write(path, json_string)?;
    Ok(())
}

/// Loads a delivery-flow document.
pub fn read_document(path: &Path) -> Result<DeliveryFlowDocument> {
    let source = fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&source)?;
    if value.get("deliveryFlows").is_none() {
        return Err(ToolError::InvalidDocument(format!(
            "{} has no deliveryFlows array",
            path.display()
        )));
    }
    Ok(serde_json::from_value(value)?)
}

/// Flow type of a document: taken from its alarm definitions, else from the
/// file name, else nurse calls.
pub fn document_flow_type(document: &DeliveryFlowDocument, path: &Path) -> FlowType {
    if let Some(flow_type) = document
        .alarm_alert_definitions
        .iter()
        .find_map(|definition| FlowType::from_definition_type(&definition.kind))
    {
        return flow_type;
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    FlowType::ALL
        .into_iter()
        .find(|flow_type| flow_type.file_name().eq_ignore_ascii_case(&file_name))
        .unwrap_or(FlowType::NurseCalls)
}

/// Recovers spreadsheet rows from a generated document: one row per alarm of
/// every flow, plus the units the flows name.
pub fn document_to_workbook(
    document: &DeliveryFlowDocument,
    flow_type: FlowType,
) -> ParsedWorkbook {
    let mut parsed = ParsedWorkbook::default();

    for flow in &document.delivery_flows {
        let config_group = flow_config_group(flow);
        let template = flow_row_template(flow, &config_group);

        for alarm in &flow.alarms_alerts {
            let mut row = template.clone();
            row.alarm_name = alarm.clone();
            row.sending_name = sending_name(document, alarm);
            parsed.rows_mut(flow_type).push(row);
        }

        let no_caregiver = flow
            .destinations
            .iter()
            .find(|destination| destination.destination_type == "NoDeliveries")
            .and_then(|destination| destination.groups.first())
            .map(|group| group.name.clone());

        for unit in &flow.units {
            let position = match parsed.units.iter().position(|existing| {
                existing.facility == unit.facility_name && existing.name == unit.name
            }) {
                Some(position) => position,
                None => {
                    parsed.units.push(UnitRow {
                        facility: unit.facility_name.clone(),
                        name: unit.name.clone(),
                        ..UnitRow::default()
                    });
                    parsed.units.len() - 1
                }
            };
            let entry = &mut parsed.units[position];
            if entry.config_group(flow_type).is_empty() {
                *entry.config_group_mut(flow_type) = config_group.clone();
            }
            if let Some(group) = &no_caregiver {
                if entry.no_caregiver_group.is_empty() {
                    entry.no_caregiver_group = group.clone();
                }
            }
        }
    }

    debug!(%flow_type, rows = parsed.row_count(), "rows recovered from document");
    parsed
}

/// Config group named in the flow name; the first one for merged flows.
fn flow_config_group(flow: &DeliveryFlow) -> String {
    let segments: Vec<&str> = flow.name.rsplitn(3, NAME_SEPARATOR).collect();
    segments
        .get(1)
        .and_then(|groups| groups.split(LIST_SEPARATOR).next())
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn sending_name(document: &DeliveryFlowDocument, alarm: &str) -> String {
    document
        .alarm_alert_definitions
        .iter()
        .find(|definition| definition.name == alarm)
        .and_then(|definition| definition.values.first())
        .map(|value| value.value.clone())
        .filter(|value| value != alarm)
        .unwrap_or_default()
}

fn flow_row_template(flow: &DeliveryFlow, config_group: &str) -> FlowRow {
    let parameter = |name: &str| flow.parameter(name).map(|attribute| attribute.text());
    let kinds = interface_kinds(flow);
    let priority = map_priority(&flow.priority, PriorityTable::for_interfaces(&kinds));

    let ringtone = parameter("badgeAlertSound")
        .or_else(|| parameter("alertSound"))
        .unwrap_or_default();
    let response_options = parameter("responseType")
        .map(|token| ResponseType::from_token(&token).options_text().to_string())
        .unwrap_or_default();
    let escalate_after = if parameter("declineCount").is_some() {
        "All Decline".to_string()
    } else {
        String::new()
    };

    let mut recipients: [String; RECIPIENT_SLOTS] = Default::default();
    let mut timings: [String; RECIPIENT_SLOTS] = Default::default();
    for destination in &flow.destinations {
        if destination.order >= RECIPIENT_SLOTS {
            continue;
        }
        let Some(recipient) = recipient_of(destination) else {
            continue;
        };
        recipients[destination.order] = recipient.to_cell_text();
        if destination.delay_time > 0 {
            timings[destination.order] = destination.delay_time.to_string();
        }
    }

    let condition_value = |name: &str| {
        flow.conditions
            .iter()
            .find(|condition| condition.name == name)
            .and_then(|condition| condition.filters.first())
            .and_then(|filter| filter.value.clone())
            .unwrap_or_default()
    };

    FlowRow {
        alarm_name: String::new(),
        sending_name: String::new(),
        priority_raw: priority.display_name().to_string(),
        priority,
        config_group: config_group.to_string(),
        device_a: kinds
            .first()
            .map(|kind| kind.device_name().to_string())
            .unwrap_or_default(),
        device_b: kinds
            .get(1)
            .map(|kind| kind.device_name().to_string())
            .unwrap_or_default(),
        ringtone,
        response_options,
        break_through_dnd: parameter("breakThrough").unwrap_or_default(),
        enunciate: parameter("enunciate")
            .and_then(|value| parse_bool_like(&value))
            .unwrap_or(true),
        escalate_after,
        recipients,
        timings,
        pod_filter: condition_value("PODRoomFilter"),
        room_filter: condition_value("RoomNumberFilter"),
        in_scope: true,
    }
}
