//! Renders flow groups into the delivery-flow document.

use tracing::debug;

use crate::engage::tools::config::ConverterConfig;
use crate::engage::tools::merge::FlowGroup;
use crate::engage::tools::model::{
    AlarmDefinition, Condition, DefinitionValue, DeliveryFlow, DeliveryFlowDocument, Filter,
    FlowRow, FlowType, Interface, InterfaceKind, NamedRef, RECIPIENT_SLOTS, UnitRow,
};
use crate::engage::tools::normalize::{parse_delay, resolve_interfaces};

pub mod parameters;
pub mod recipients;

pub use parameters::build_parameters;
pub use recipients::{Recipient, parse_recipient, recipient_of};

/// Separator between the segments of a flow name.
pub const NAME_SEPARATOR: &str = " | ";
/// Separator between list entries inside one flow-name segment.
pub const LIST_SEPARATOR: &str = " / ";

/// Builds the document for one flow type from its groups, in group order.
pub fn assemble_document(
    flow_type: FlowType,
    groups: &[FlowGroup],
    units: &[UnitRow],
    config: &ConverterConfig,
) -> DeliveryFlowDocument {
    let delivery_flows: Vec<DeliveryFlow> = groups
        .iter()
        .map(|group| assemble_flow(flow_type, group, units, config))
        .collect();
    debug!(%flow_type, flows = delivery_flows.len(), "assembled delivery flows");

    DeliveryFlowDocument {
        version: config.version.clone(),
        alarm_alert_definitions: alarm_definitions(flow_type, groups),
        delivery_flows,
    }
}

/// Renders one group. A group with no recipients and no recognisable device
/// still yields a flow, with empty destinations and interfaces.
pub fn assemble_flow(
    flow_type: FlowType,
    group: &FlowGroup,
    units: &[UnitRow],
    config: &ConverterConfig,
) -> DeliveryFlow {
    let row = group.representative();
    let alarms = group.alarm_names();
    let config_groups = group.config_groups();
    let flow_units = units_for(flow_type, &config_groups, units);
    let facility = flow_units
        .first()
        .map(|unit| unit.facility_name.clone())
        .unwrap_or_default();

    let kinds = resolve_interfaces(
        &row.device_a,
        &row.device_b,
        &config.default_interfaces.enabled(),
    );
    let interfaces = kinds
        .iter()
        .map(|kind| Interface {
            component_name: kind.component_name().to_string(),
            reference_name: config.reference_names.for_kind(*kind).to_string(),
        })
        .collect();

    let mut conditions = base_conditions(flow_type, row);
    let mut destinations = Vec::new();
    for slot in 0..RECIPIENT_SLOTS {
        let Some(recipient) = parse_recipient(&row.recipients[slot]) else {
            continue;
        };
        if let Recipient::CustomUnit(roles) = &recipient {
            conditions.push(recipients::custom_unit_condition(
                slot,
                roles,
                &flow_units,
                row.priority,
            ));
        }
        let delay = parse_delay(&row.timings[slot]);
        destinations.push(recipients::destination(slot, delay, &recipient, &facility));
    }
    let recipient_count = destinations.len();

    if flow_type == FlowType::Clinicals {
        if let Some((group_facility, no_caregiver)) =
            no_caregiver_group(&config_groups, units, flow_type)
        {
            let order = destinations.last().map(|last| last.order + 1).unwrap_or(0);
            destinations.push(recipients::no_caregiver_destination(
                order,
                no_caregiver,
                group_facility,
            ));
        }
    }

    DeliveryFlow {
        name: flow_name(flow_type, row, &alarms, &config_groups, &flow_units),
        priority: row.priority.as_str().to_string(),
        status: "Active".to_string(),
        alarms_alerts: alarms,
        conditions,
        destinations,
        interfaces,
        parameter_attributes: build_parameters(flow_type, row, &kinds, recipient_count),
        units: flow_units,
    }
}

fn flow_name(
    flow_type: FlowType,
    row: &FlowRow,
    alarms: &[String],
    config_groups: &[String],
    units: &[NamedRef],
) -> String {
    let unit_names: Vec<&str> = units.iter().map(|unit| unit.name.as_str()).collect();
    [
        format!("SEND {}", flow_type.flow_label()),
        row.priority.as_str().to_uppercase(),
        alarms.join(LIST_SEPARATOR),
        config_groups.join(LIST_SEPARATOR),
        unit_names.join(LIST_SEPARATOR),
    ]
    .join(NAME_SEPARATOR)
}

fn base_conditions(flow_type: FlowType, row: &FlowRow) -> Vec<Condition> {
    let default = match flow_type {
        FlowType::NurseCalls => Condition {
            name: "NurseCallsCondition".to_string(),
            filters: vec![
                Filter::new("bed", "not_null", None),
                Filter::new("status", "equal", Some("Active".to_string())),
            ],
        },
        FlowType::Clinicals => Condition {
            name: "ClinicalsCondition".to_string(),
            filters: vec![
                Filter::new("bed", "not_null", None),
                Filter::new("state", "equal", Some("Active".to_string())),
            ],
        },
        FlowType::Orders => Condition {
            name: "OrdersCondition".to_string(),
            filters: vec![Filter::new("patient.current_place", "not_null", None)],
        },
    };

    let mut conditions = vec![default];
    if !row.pod_filter.is_empty() {
        conditions.push(Condition {
            name: "PODRoomFilter".to_string(),
            filters: vec![Filter::new("bed.room.pod", "in", Some(row.pod_filter.clone()))],
        });
    }
    if !row.room_filter.is_empty() {
        conditions.push(Condition {
            name: "RoomNumberFilter".to_string(),
            filters: vec![Filter::new(
                "bed.room.room_number",
                "in",
                Some(row.room_filter.clone()),
            )],
        });
    }
    conditions
}

/// Units that use one of `config_groups` for this flow type.
fn units_for(flow_type: FlowType, config_groups: &[String], units: &[UnitRow]) -> Vec<NamedRef> {
    let mut refs: Vec<NamedRef> = Vec::new();
    for unit in units {
        let group = unit.config_group(flow_type);
        if group.is_empty() || !config_groups.iter().any(|candidate| candidate == group) {
            continue;
        }
        let named = NamedRef::new(&unit.facility, &unit.name);
        if !refs.contains(&named) {
            refs.push(named);
        }
    }
    refs
}

fn no_caregiver_group<'a>(
    config_groups: &[String],
    units: &'a [UnitRow],
    flow_type: FlowType,
) -> Option<(&'a str, &'a str)> {
    units
        .iter()
        .filter(|unit| {
            config_groups
                .iter()
                .any(|group| group == unit.config_group(flow_type))
        })
        .find(|unit| !unit.no_caregiver_group.is_empty())
        .map(|unit| (unit.facility.as_str(), unit.no_caregiver_group.as_str()))
}

/// One definition per distinct non-empty alarm name, listing the sending
/// system labels that raise it.
fn alarm_definitions(flow_type: FlowType, groups: &[FlowGroup]) -> Vec<AlarmDefinition> {
    let mut definitions: Vec<AlarmDefinition> = Vec::new();
    for row in groups.iter().flat_map(|group| group.rows.iter()) {
        if row.alarm_name.is_empty() {
            continue;
        }
        let label = if row.sending_name.is_empty() {
            &row.alarm_name
        } else {
            &row.sending_name
        };

        let position = match definitions
            .iter()
            .position(|definition| definition.name == row.alarm_name)
        {
            Some(position) => position,
            None => {
                definitions.push(AlarmDefinition {
                    name: row.alarm_name.clone(),
                    kind: flow_type.definition_type().to_string(),
                    values: Vec::new(),
                });
                definitions.len() - 1
            }
        };

        let values = &mut definitions[position].values;
        if !values.iter().any(|value| &value.value == label) {
            values.push(DefinitionValue {
                category: String::new(),
                value: label.clone(),
            });
        }
    }
    definitions
}

/// Interfaces named by a flow, in output order.
pub fn interface_kinds(flow: &DeliveryFlow) -> Vec<InterfaceKind> {
    flow.interfaces
        .iter()
        .filter_map(|interface| InterfaceKind::from_component_name(&interface.component_name))
        .collect()
}
