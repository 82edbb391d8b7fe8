use crate::engage::tools::model::{
    FlowRow, FlowType, InterfaceKind, ParameterAttribute, ResponseType,
};
use crate::engage::tools::normalize::{
    escalates_after_all, is_global_setting, response_type, with_wav_extension,
    without_wav_extension,
};

const TTL_MINUTES: u32 = 10;

struct Templates {
    message: &'static str,
    patient_mrn: &'static str,
    additional_content: &'static str,
}

fn templates(flow_type: FlowType) -> Templates {
    match flow_type {
        FlowType::NurseCalls => Templates {
            message: "#{alert_type}\nRoom/Bed: #{bed.room.room_number} - #{bed.bed_number}",
            patient_mrn: "#{bed.patient.mrn}:#{bed.patient.visit_number}",
            additional_content: "Patient: #{bed.patient.last_name}, #{bed.patient.first_name}",
        },
        FlowType::Clinicals => Templates {
            message: "#{alarm_name}\nRoom/Bed: #{bed.room.room_number} - #{bed.bed_number}",
            patient_mrn: "#{clinical_patient.mrn}:#{clinical_patient.visit_number}",
            additional_content: "Value: #{alarm_value}\n\
                Patient: #{clinical_patient.last_name}, #{clinical_patient.first_name}",
        },
        FlowType::Orders => Templates {
            message: "#{order_type} order\nRoom/Bed: #{patient.current_place.room_number}",
            patient_mrn: "#{patient.mrn}:#{patient.visit_number}",
            additional_content: "Order: #{order_description}",
        },
    }
}

/// Parameter attributes for a flow delivered through `interfaces`.
///
/// `breakThrough` and `enunciate` lead every flow, including flows with no
/// interface. Each interface then contributes its own set; when several
/// interfaces emit the same parameter the first (in interface order) wins.
pub fn build_parameters(
    flow_type: FlowType,
    row: &FlowRow,
    interfaces: &[InterfaceKind],
    recipient_count: usize,
) -> Vec<ParameterAttribute> {
    let mut attributes = vec![
        ParameterAttribute::quoted("breakThrough", &row.break_through_dnd),
        ParameterAttribute::literal("enunciate", row.enunciate),
    ];
    for kind in interfaces {
        for attribute in interface_parameters(*kind, flow_type, row, recipient_count) {
            if !attributes.iter().any(|existing| existing.name == attribute.name) {
                attributes.push(attribute);
            }
        }
    }
    attributes
}

fn interface_parameters(
    kind: InterfaceKind,
    flow_type: FlowType,
    row: &FlowRow,
    recipient_count: usize,
) -> Vec<ParameterAttribute> {
    let templates = templates(flow_type);
    let responses = response_type(&row.response_options);

    let mut attributes = vec![
        ParameterAttribute::quoted("message", templates.message),
        ParameterAttribute::quoted("patientMRN", templates.patient_mrn),
        ParameterAttribute::literal("ttl", TTL_MINUTES),
        ParameterAttribute::quoted("retractRules", "ttlHasElapsed"),
        ParameterAttribute::quoted("responseType", responses.as_str()),
    ];
    attributes.extend(response_parameters(responses));

    let ringtone = row.ringtone.trim();
    if !ringtone.is_empty() {
        attributes.push(match kind {
            InterfaceKind::Edge => {
                ParameterAttribute::quoted("alertSound", &without_wav_extension(ringtone))
            }
            _ if is_global_setting(ringtone) => {
                ParameterAttribute::quoted("badgeAlertSound", ringtone)
            }
            _ => ParameterAttribute::quoted("badgeAlertSound", &with_wav_extension(ringtone)),
        });
    }

    if kind == InterfaceKind::Xmpp {
        attributes.extend([
            ParameterAttribute::literal("audible", true),
            ParameterAttribute::literal("realert", false),
            ParameterAttribute::literal("multipleAccepts", false),
            ParameterAttribute::literal("delayedResponses", false),
            ParameterAttribute::quoted("additionalContent", templates.additional_content),
        ]);
    }

    if escalates_after_all(&row.escalate_after) {
        attributes.push(ParameterAttribute::literal("declineCount", recipient_count));
    }

    attributes
}

fn response_parameters(responses: ResponseType) -> Vec<ParameterAttribute> {
    match responses {
        ResponseType::None => Vec::new(),
        ResponseType::AcceptDecline => vec![
            ParameterAttribute::quoted("accept", "Accepted"),
            ParameterAttribute::quoted("decline", "Decline Primary"),
        ],
        ResponseType::AcceptDeclineCall => vec![
            ParameterAttribute::quoted("accept", "Accepted"),
            ParameterAttribute::quoted("decline", "Decline Primary"),
            ParameterAttribute::quoted("callback", "Call Back"),
        ],
    }
}
