//! Vocabulary normalisation.
//!
//! Source workbooks are authored by hand, so the same concept shows up under
//! many spellings. Each semantic field gets one classification function
//! here, all working on trimmed, case-folded text.

use tracing::debug;

use crate::engage::tools::model::{InterfaceKind, Priority, ResponseType};

pub mod row;

pub use row::normalize_row;

/// Break-through token allowing the alert through both Vocera and device DND.
pub const BREAK_THROUGH_ALL: &str = "voceraAndDevice";
/// Break-through token allowing the alert through device DND only.
pub const BREAK_THROUGH_DEVICE: &str = "device";
/// Break-through token honouring DND.
pub const BREAK_THROUGH_NONE: &str = "none";

/// Ringtone value meaning "use the badge's configured sound".
pub const GLOBAL_SETTING_RINGTONE: &str = "Global Setting";

const CELL_ERROR_MARKERS: [&str; 7] = [
    "#N/A", "#REF!", "#VALUE!", "#DIV/0!", "#NAME?", "#NUM!", "#NULL!",
];

/// Which priority vocabulary applies to a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityTable {
    /// Shared by Vocera, VMP and XMPP interfaces.
    Vocera,
    Edge,
}

impl PriorityTable {
    pub fn for_interfaces(interfaces: &[InterfaceKind]) -> Self {
        if interfaces.contains(&InterfaceKind::Edge) {
            PriorityTable::Edge
        } else {
            PriorityTable::Vocera
        }
    }
}

pub(crate) fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

fn compact(folded: &str) -> String {
    folded
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '-' && *ch != '_')
        .collect()
}

/// Strips spreadsheet error results and unresolved formula text.
pub fn clean_cell_text(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with('=') {
        return String::new();
    }
    if CELL_ERROR_MARKERS
        .iter()
        .any(|marker| trimmed.eq_ignore_ascii_case(marker))
    {
        return String::new();
    }
    trimmed.to_string()
}

/// Maps a free-text device descriptor to its outgoing interface.
///
/// VCS is checked before plain Vocera because "Vocera VCS" contains both.
pub fn classify_device(device: &str) -> Option<InterfaceKind> {
    let folded = fold(device);
    if folded.is_empty() {
        return None;
    }
    let compacted = compact(&folded);

    if folded.contains("edge") {
        Some(InterfaceKind::Edge)
    } else if compacted.contains("voceravcs") || folded.contains("vcs") {
        Some(InterfaceKind::Vmp)
    } else if folded.contains("vocera") || folded.contains("vmi") {
        Some(InterfaceKind::Vocera)
    } else if folded.contains("xmpp") {
        Some(InterfaceKind::Xmpp)
    } else {
        None
    }
}

/// Distinct interfaces of both device columns in output order, falling back
/// to `defaults` when neither column resolves.
pub fn resolve_interfaces(
    device_a: &str,
    device_b: &str,
    defaults: &[InterfaceKind],
) -> Vec<InterfaceKind> {
    let mut kinds: Vec<InterfaceKind> = [device_a, device_b]
        .into_iter()
        .filter_map(classify_device)
        .collect();
    if kinds.is_empty() {
        kinds.extend_from_slice(defaults);
    }
    kinds.sort();
    kinds.dedup();
    kinds
}

/// Maps free-text priority through the given table.
pub fn map_priority(raw: &str, table: PriorityTable) -> Priority {
    let folded = compact(&fold(raw));
    match table {
        PriorityTable::Vocera => match folded.as_str() {
            "urgent" | "critical" | "stat" => Priority::Urgent,
            "high" | "medium" => Priority::High,
            _ => Priority::Normal,
        },
        PriorityTable::Edge => match folded.as_str() {
            "urgent" | "urgent(edge)" | "critical" => Priority::Urgent,
            "high" | "high(edge)" => Priority::High,
            _ => Priority::Normal,
        },
    }
}

/// Yes/No style cell values. Blank and unrecognised text yield `None` so the
/// caller can pick a field-specific default.
pub fn parse_bool_like(raw: &str) -> Option<bool> {
    match fold(raw).as_str() {
        "yes" | "y" | "true" | "1" | "x" | "enunciate" | "enunciation" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Blank or unrecognised enunciate values default to enunciating.
pub fn parse_enunciate(raw: &str) -> bool {
    parse_bool_like(raw).unwrap_or(true)
}

/// Rows are in scope unless explicitly marked otherwise.
pub fn parse_in_scope(raw: &str) -> bool {
    parse_bool_like(raw).unwrap_or(true)
}

/// Canonical break-through token. Explicit values always win; blank cells fall
/// back to what the priority implies.
pub fn normalize_break_through(raw: &str, priority: Priority) -> String {
    let folded = fold(raw);
    match folded.as_str() {
        "" => default_break_through(priority).to_string(),
        "yes" | "y" | "true" | "all" | "voceraanddevice" | "vocera and device" => {
            BREAK_THROUGH_ALL.to_string()
        }
        "device" | "device only" => BREAK_THROUGH_DEVICE.to_string(),
        "no" | "n" | "false" | "none" => BREAK_THROUGH_NONE.to_string(),
        _ => raw.trim().to_string(),
    }
}

fn default_break_through(priority: Priority) -> &'static str {
    match priority {
        Priority::Urgent => BREAK_THROUGH_ALL,
        Priority::Normal | Priority::High => BREAK_THROUGH_NONE,
    }
}

fn response_tokens(options: &str) -> impl Iterator<Item = String> + '_ {
    options
        .split(',')
        .map(fold)
        .filter(|token| !token.is_empty())
}

/// Classifies a comma-separated response option list.
pub fn response_type(options: &str) -> ResponseType {
    let tokens: Vec<String> = response_tokens(options).collect();
    let has = |needle: &str| tokens.iter().any(|token| token.contains(needle));

    if has("call back") || has("callback") {
        ResponseType::AcceptDeclineCall
    } else if has("escalate") || has("decline") {
        ResponseType::AcceptDecline
    } else {
        ResponseType::None
    }
}

/// Whitespace- and case-insensitive form of a response option list.
pub fn canonical_response_options(options: &str) -> String {
    response_tokens(options).collect::<Vec<_>>().join(",")
}

/// Delay in seconds from a "Time to Nth Recipient" cell. Text without digits
/// (blank, "Immediate") means no delay; delays too large for `u32` saturate.
pub fn parse_delay(text: &str) -> u32 {
    let digits: String = text
        .trim()
        .chars()
        .skip_while(|ch| !ch.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or_else(|_| {
        debug!(delay = %text.trim(), "delay out of range, saturated");
        u32::MAX
    })
}

/// Escalation that waits for every recipient to decline.
pub fn escalates_after_all(escalate_after: &str) -> bool {
    fold(escalate_after).contains("all")
}

fn wav_stem(ringtone: &str) -> Option<&str> {
    let split = ringtone.len().checked_sub(4)?;
    let suffix = ringtone.get(split..)?;
    suffix
        .eq_ignore_ascii_case(".wav")
        .then(|| &ringtone[..split])
}

/// Appends `.wav` unless already present.
pub fn with_wav_extension(ringtone: &str) -> String {
    let trimmed = ringtone.trim();
    match wav_stem(trimmed) {
        Some(_) => trimmed.to_string(),
        None => format!("{trimmed}.wav"),
    }
}

/// Removes a trailing `.wav` if present.
pub fn without_wav_extension(ringtone: &str) -> String {
    let trimmed = ringtone.trim();
    wav_stem(trimmed).unwrap_or(trimmed).to_string()
}

pub fn is_global_setting(ringtone: &str) -> bool {
    ringtone.trim().eq_ignore_ascii_case(GLOBAL_SETTING_RINGTONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcs_devices_classify_before_plain_vocera() {
        assert_eq!(classify_device("Vocera VCS"), Some(InterfaceKind::Vmp));
        assert_eq!(classify_device("VoceraVCS"), Some(InterfaceKind::Vmp));
        assert_eq!(classify_device("vocera   vcs app"), Some(InterfaceKind::Vmp));
        assert_eq!(classify_device("Vocera Badge"), Some(InterfaceKind::Vocera));
        assert_eq!(classify_device("VMI"), Some(InterfaceKind::Vocera));
    }

    #[test]
    fn classifies_edge_and_xmpp_devices() {
        assert_eq!(classify_device("iPhone-Edge"), Some(InterfaceKind::Edge));
        assert_eq!(classify_device(" EDGE "), Some(InterfaceKind::Edge));
        assert_eq!(classify_device("XMPP client"), Some(InterfaceKind::Xmpp));
        assert_eq!(classify_device("Pager"), None);
        assert_eq!(classify_device(""), None);
    }

    #[test]
    fn both_device_columns_contribute_interfaces_edge_first() {
        let kinds = resolve_interfaces("Vocera VCS", "iPhone-Edge", &[]);
        assert_eq!(kinds, vec![InterfaceKind::Edge, InterfaceKind::Vmp]);

        let kinds = resolve_interfaces("Vocera VCS", "VoceraVCS", &[]);
        assert_eq!(kinds, vec![InterfaceKind::Vmp]);
    }

    #[test]
    fn defaults_apply_only_when_no_device_resolves() {
        let defaults = [InterfaceKind::Vocera];
        assert_eq!(
            resolve_interfaces("", "", &defaults),
            vec![InterfaceKind::Vocera]
        );
        assert_eq!(
            resolve_interfaces("XMPP", "", &defaults),
            vec![InterfaceKind::Xmpp]
        );
        assert!(resolve_interfaces("", "unknown", &[]).is_empty());
    }

    #[test]
    fn priority_tables_differ_for_edge() {
        assert_eq!(map_priority("Medium", PriorityTable::Vocera), Priority::High);
        assert_eq!(map_priority("Medium", PriorityTable::Edge), Priority::Normal);
        assert_eq!(map_priority("High(Edge)", PriorityTable::Edge), Priority::High);
        assert_eq!(map_priority(" URGENT ", PriorityTable::Vocera), Priority::Urgent);
        assert_eq!(map_priority("", PriorityTable::Edge), Priority::Normal);
    }

    #[test]
    fn bool_like_values() {
        for yes in ["Yes", "y", "TRUE", "Enunciate", "enunciation", "1"] {
            assert_eq!(parse_bool_like(yes), Some(true), "{yes}");
        }
        for no in ["No", "n", "False", "0"] {
            assert_eq!(parse_bool_like(no), Some(false), "{no}");
        }
        assert_eq!(parse_bool_like("  "), None);
        assert!(parse_enunciate(""));
        assert!(!parse_enunciate("N"));
        assert!(parse_in_scope(""));
        assert!(!parse_in_scope("FALSE"));
    }

    #[test]
    fn break_through_prefers_explicit_value() {
        assert_eq!(normalize_break_through("none", Priority::Urgent), "none");
        assert_eq!(normalize_break_through("Yes", Priority::Normal), BREAK_THROUGH_ALL);
        assert_eq!(normalize_break_through("Device Only", Priority::High), "device");
        assert_eq!(normalize_break_through("", Priority::Urgent), BREAK_THROUGH_ALL);
        assert_eq!(normalize_break_through("", Priority::High), BREAK_THROUGH_NONE);
    }

    #[test]
    fn response_types_follow_tokens() {
        assert_eq!(response_type(""), ResponseType::None);
        assert_eq!(response_type("Accept"), ResponseType::None);
        assert_eq!(response_type("Accept,  Escalate"), ResponseType::AcceptDecline);
        assert_eq!(
            response_type("accept, escalate,   CALL BACK"),
            ResponseType::AcceptDeclineCall
        );
        assert_eq!(
            canonical_response_options("Accept,   Escalate ,"),
            canonical_response_options("accept,escalate")
        );
    }

    #[test]
    fn cell_errors_read_as_empty() {
        assert_eq!(clean_cell_text("#N/A"), "");
        assert_eq!(clean_cell_text("#ref!"), "");
        assert_eq!(clean_cell_text("=VLOOKUP(A1,B:C,2)"), "");
        assert_eq!(clean_cell_text("  Code Blue "), "Code Blue");
    }

    #[test]
    fn delays_and_sounds() {
        assert_eq!(parse_delay("60"), 60);
        assert_eq!(parse_delay("90 sec"), 90);
        assert_eq!(parse_delay("Immediate"), 0);
        assert_eq!(parse_delay("99999999999"), u32::MAX);
        assert_eq!(with_wav_extension("list_pagers"), "list_pagers.wav");
        assert_eq!(with_wav_extension("list_pagers.wav"), "list_pagers.wav");
        assert_eq!(without_wav_extension("chime.WAV"), "chime");
        assert!(escalates_after_all("After All Decline"));
        assert!(!escalates_after_all("1 decline"));
    }
}
