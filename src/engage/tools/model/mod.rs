use std::fmt;

use serde::{Deserialize, Serialize};

pub mod document;

pub use document::{
    AlarmDefinition, Condition, DefinitionValue, DeliveryFlow, DeliveryFlowDocument, Destination,
    Filter, Interface, NamedRef, ParameterAttribute,
};

/// Number of recipient slots (1st..5th) a rule can escalate through.
pub const RECIPIENT_SLOTS: usize = 5;

/// The three delivery-flow documents produced by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowType {
    NurseCalls,
    Clinicals,
    Orders,
}

impl FlowType {
    pub const ALL: [FlowType; 3] = [FlowType::NurseCalls, FlowType::Clinicals, FlowType::Orders];

    /// File name of the JSON document written for this flow type.
    pub fn file_name(self) -> &'static str {
        match self {
            FlowType::NurseCalls => "nurseCalls.json",
            FlowType::Clinicals => "clinicals.json",
            FlowType::Orders => "orders.json",
        }
    }

    /// Label used in the `SEND <TYPE>` flow name prefix.
    pub fn flow_label(self) -> &'static str {
        match self {
            FlowType::NurseCalls => "NURSECALL",
            FlowType::Clinicals => "CLINICAL",
            FlowType::Orders => "ORDER",
        }
    }

    /// Value of the `type` field on alarm definitions.
    pub fn definition_type(self) -> &'static str {
        match self {
            FlowType::NurseCalls => "NurseCalls",
            FlowType::Clinicals => "Clinicals",
            FlowType::Orders => "Orders",
        }
    }

    /// Canonical sheet name used when exporting rows to a workbook.
    pub fn sheet_name(self) -> &'static str {
        match self {
            FlowType::NurseCalls => "Nurse Call",
            FlowType::Clinicals => "Patient Monitoring",
            FlowType::Orders => "Orders",
        }
    }

    /// Resolves an alarm definition `type` back into a flow type.
    pub fn from_definition_type(value: &str) -> Option<Self> {
        FlowType::ALL
            .into_iter()
            .find(|flow_type| flow_type.definition_type().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowType::NurseCalls => write!(f, "nurseCalls"),
            FlowType::Clinicals => write!(f, "clinicals"),
            FlowType::Orders => write!(f, "orders"),
        }
    }
}

/// Canonical delivery priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    /// Lower-case token used in the output document.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Capitalised form written back into spreadsheets.
    pub fn display_name(self) -> &'static str {
        match self {
            Priority::Normal => "Normal",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }
}

/// Outgoing interface a flow is delivered through. The declaration order is
/// the order interfaces appear in a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InterfaceKind {
    Edge,
    Vmp,
    Vocera,
    Xmpp,
}

impl InterfaceKind {
    pub const ALL: [InterfaceKind; 4] = [
        InterfaceKind::Edge,
        InterfaceKind::Vmp,
        InterfaceKind::Vocera,
        InterfaceKind::Xmpp,
    ];

    pub fn component_name(self) -> &'static str {
        match self {
            InterfaceKind::Edge => "OutgoingWCTP",
            InterfaceKind::Vmp => "VMP",
            InterfaceKind::Vocera => "Vocera",
            InterfaceKind::Xmpp => "XMPP",
        }
    }

    /// Device text that classifies back into this interface.
    pub fn device_name(self) -> &'static str {
        match self {
            InterfaceKind::Edge => "iPhone-Edge",
            InterfaceKind::Vmp => "Vocera VCS",
            InterfaceKind::Vocera => "Vocera",
            InterfaceKind::Xmpp => "XMPP",
        }
    }

    pub fn from_component_name(value: &str) -> Option<Self> {
        InterfaceKind::ALL
            .into_iter()
            .find(|kind| kind.component_name().eq_ignore_ascii_case(value.trim()))
    }
}

/// Response capability offered on the receiving device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseType {
    #[default]
    None,
    AcceptDecline,
    AcceptDeclineCall,
}

impl ResponseType {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseType::None => "None",
            ResponseType::AcceptDecline => "Accept/Decline",
            ResponseType::AcceptDeclineCall => "Accept/Decline/Call",
        }
    }

    pub fn from_token(value: &str) -> Self {
        match value.trim() {
            "Accept/Decline" => ResponseType::AcceptDecline,
            "Accept/Decline/Call" => ResponseType::AcceptDeclineCall,
            _ => ResponseType::None,
        }
    }

    /// Response options text that parses back into this response type.
    pub fn options_text(self) -> &'static str {
        match self {
            ResponseType::None => "",
            ResponseType::AcceptDecline => "Accept, Escalate",
            ResponseType::AcceptDeclineCall => "Accept, Escalate, Call Back",
        }
    }
}

/// Cell values of one alarm rule exactly as the source presented them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub config_group: String,
    pub alarm_name: String,
    pub sending_name: String,
    pub priority: String,
    pub device_a: String,
    pub device_b: String,
    pub ringtone: String,
    pub response_options: String,
    pub break_through_dnd: String,
    pub enunciate: String,
    pub escalate_after: String,
    pub recipients: [String; RECIPIENT_SLOTS],
    pub timings: [String; RECIPIENT_SLOTS],
    pub in_scope: String,
    pub pod_filter: String,
    pub room_filter: String,
}

impl RawRow {
    /// True when the row carries no value at all, as spacer rows do.
    pub fn is_blank(&self) -> bool {
        [
            &self.config_group,
            &self.alarm_name,
            &self.sending_name,
            &self.priority,
            &self.device_a,
            &self.device_b,
            &self.ringtone,
            &self.response_options,
            &self.break_through_dnd,
            &self.enunciate,
            &self.escalate_after,
            &self.in_scope,
            &self.pod_filter,
            &self.room_filter,
        ]
        .into_iter()
        .chain(self.recipients.iter())
        .chain(self.timings.iter())
        .all(|value| value.trim().is_empty())
    }
}

/// One parsed alarm rule after vocabulary normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowRow {
    pub alarm_name: String,
    /// Upstream system label. Never part of the merge key.
    pub sending_name: String,
    pub priority_raw: String,
    pub priority: Priority,
    pub config_group: String,
    pub device_a: String,
    pub device_b: String,
    pub ringtone: String,
    pub response_options: String,
    /// Canonical break-through token, already defaulted from priority.
    pub break_through_dnd: String,
    pub enunciate: bool,
    pub escalate_after: String,
    pub recipients: [String; RECIPIENT_SLOTS],
    pub timings: [String; RECIPIENT_SLOTS],
    pub pod_filter: String,
    pub room_filter: String,
    pub in_scope: bool,
}

/// A row of the unit breakdown table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitRow {
    pub facility: String,
    pub name: String,
    pub nurse_call_group: String,
    pub clinical_group: String,
    pub orders_group: String,
    pub no_caregiver_group: String,
}

impl UnitRow {
    /// Config group this unit uses for the given flow type.
    pub fn config_group(&self, flow_type: FlowType) -> &str {
        match flow_type {
            FlowType::NurseCalls => &self.nurse_call_group,
            FlowType::Clinicals => &self.clinical_group,
            FlowType::Orders => &self.orders_group,
        }
    }

    pub fn config_group_mut(&mut self, flow_type: FlowType) -> &mut String {
        match flow_type {
            FlowType::NurseCalls => &mut self.nurse_call_group,
            FlowType::Clinicals => &mut self.clinical_group,
            FlowType::Orders => &mut self.orders_group,
        }
    }
}

/// Everything a source document yields: the unit table plus normalised rows
/// per flow type, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedWorkbook {
    pub units: Vec<UnitRow>,
    pub nurse_calls: Vec<FlowRow>,
    pub clinicals: Vec<FlowRow>,
    pub orders: Vec<FlowRow>,
}

impl ParsedWorkbook {
    pub fn rows(&self, flow_type: FlowType) -> &[FlowRow] {
        match flow_type {
            FlowType::NurseCalls => &self.nurse_calls,
            FlowType::Clinicals => &self.clinicals,
            FlowType::Orders => &self.orders,
        }
    }

    pub fn rows_mut(&mut self, flow_type: FlowType) -> &mut Vec<FlowRow> {
        match flow_type {
            FlowType::NurseCalls => &mut self.nurse_calls,
            FlowType::Clinicals => &mut self.clinicals,
            FlowType::Orders => &mut self.orders,
        }
    }

    pub fn row_count(&self) -> usize {
        self.nurse_calls.len() + self.clinicals.len() + self.orders.len()
    }
}
