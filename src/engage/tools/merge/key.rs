use crate::engage::tools::model::{FlowRow, Priority, RECIPIENT_SLOTS};
use crate::engage::tools::normalize::canonical_response_options;

/// Equality key over the delivery-relevant fields of a [`FlowRow`].
///
/// Alarm name and sending-system name are left out: rows that differ only in
/// those labels deliver identically. The config group is also absent; the
/// grouping pass decides whether it partitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey {
    priority: Priority,
    device_a: String,
    device_b: String,
    ringtone: String,
    response_options: String,
    break_through_dnd: String,
    enunciate: bool,
    escalate_after: String,
    recipients: [String; RECIPIENT_SLOTS],
    timings: [String; RECIPIENT_SLOTS],
    pod_filter: String,
    room_filter: String,
}

impl MergeKey {
    /// Builds the key from a single row; it never depends on neighbouring rows.
    pub fn of(row: &FlowRow) -> Self {
        let trimmed = |value: &String| value.trim().to_string();
        Self {
            priority: row.priority,
            device_a: trimmed(&row.device_a),
            device_b: trimmed(&row.device_b),
            ringtone: trimmed(&row.ringtone),
            response_options: canonical_response_options(&row.response_options),
            break_through_dnd: trimmed(&row.break_through_dnd),
            enunciate: row.enunciate,
            escalate_after: trimmed(&row.escalate_after),
            recipients: row.recipients.each_ref().map(trimmed),
            timings: row.timings.each_ref().map(trimmed),
            pod_filter: trimmed(&row.pod_filter),
            room_filter: trimmed(&row.room_filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engage::tools::model::RawRow;
    use crate::engage::tools::normalize::normalize_row;

    fn row(alarm: &str, sending: &str) -> FlowRow {
        normalize_row(
            &RawRow {
                alarm_name: alarm.into(),
                sending_name: sending.into(),
                config_group: "4W NC".into(),
                priority: "High".into(),
                device_a: "Vocera VCS".into(),
                response_options: "Accept, Escalate".into(),
                recipients: [
                    "VAssign:[Room] RN".into(),
                    "".into(),
                    "".into(),
                    "".into(),
                    "".into(),
                ],
                ..RawRow::default()
            },
            &[],
        )
    }

    #[test]
    fn labels_do_not_affect_key() {
        assert_eq!(
            MergeKey::of(&row("Alarm 1", "NC-1")),
            MergeKey::of(&row("Alarm 2", "NC-2"))
        );
    }

    #[test]
    fn response_option_spacing_does_not_affect_key() {
        let lhs = row("Alarm 1", "");
        let mut rhs = lhs.clone();
        rhs.response_options = "accept,escalate".into();
        assert_eq!(MergeKey::of(&lhs), MergeKey::of(&rhs));
    }

    #[test]
    fn delivery_fields_affect_key() {
        let base = row("Alarm 1", "");
        let mut device = base.clone();
        device.device_b = "iPhone-Edge".into();
        let mut dnd = base.clone();
        dnd.break_through_dnd = "device".into();
        let mut enunciate = base.clone();
        enunciate.enunciate = false;
        let mut recipient = base.clone();
        recipient.recipients[1] = "VGroup: Code Team".into();

        for other in [device, dnd, enunciate, recipient] {
            assert_ne!(MergeKey::of(&base), MergeKey::of(&other));
        }
    }
}
