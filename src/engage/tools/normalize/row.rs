use crate::engage::tools::model::{FlowRow, InterfaceKind, RawRow};
use crate::engage::tools::normalize::{
    PriorityTable, clean_cell_text, map_priority, normalize_break_through, parse_enunciate,
    parse_in_scope, resolve_interfaces,
};

/// Turns raw cell text into a [`FlowRow`] with canonical tokens.
///
/// `default_interfaces` only influences which priority table applies when
/// neither device column names an interface.
pub fn normalize_row(raw: &RawRow, default_interfaces: &[InterfaceKind]) -> FlowRow {
    let device_a = clean_cell_text(&raw.device_a);
    let device_b = clean_cell_text(&raw.device_b);
    let interfaces = resolve_interfaces(&device_a, &device_b, default_interfaces);

    let priority_raw = clean_cell_text(&raw.priority);
    let priority = map_priority(&priority_raw, PriorityTable::for_interfaces(&interfaces));

    FlowRow {
        alarm_name: clean_cell_text(&raw.alarm_name),
        sending_name: clean_cell_text(&raw.sending_name),
        priority_raw,
        priority,
        config_group: clean_cell_text(&raw.config_group),
        device_a,
        device_b,
        ringtone: clean_cell_text(&raw.ringtone),
        response_options: clean_cell_text(&raw.response_options),
        break_through_dnd: normalize_break_through(
            &clean_cell_text(&raw.break_through_dnd),
            priority,
        ),
        enunciate: parse_enunciate(&clean_cell_text(&raw.enunciate)),
        escalate_after: clean_cell_text(&raw.escalate_after),
        recipients: raw.recipients.each_ref().map(|value| clean_cell_text(value)),
        timings: raw.timings.each_ref().map(|value| clean_cell_text(value)),
        pod_filter: clean_cell_text(&raw.pod_filter),
        room_filter: clean_cell_text(&raw.room_filter),
        in_scope: parse_in_scope(&clean_cell_text(&raw.in_scope)),
    }
}
