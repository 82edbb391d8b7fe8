use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level container written once per flow type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFlowDocument {
    pub version: String,
    #[serde(default)]
    pub alarm_alert_definitions: Vec<AlarmDefinition>,
    #[serde(default)]
    pub delivery_flows: Vec<DeliveryFlow>,
}

/// Declares an alarm name and the upstream labels that raise it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub values: Vec<DefinitionValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionValue {
    #[serde(default)]
    pub category: String,
    pub value: String,
}

/// One delivery rule: trigger conditions, escalation destinations,
/// interfaces and interface parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryFlow {
    pub name: String,
    pub priority: String,
    pub status: String,
    #[serde(default)]
    pub alarms_alerts: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    #[serde(default)]
    pub parameter_attributes: Vec<ParameterAttribute>,
    #[serde(default)]
    pub units: Vec<NamedRef>,
}

impl DeliveryFlow {
    /// Looks up a parameter attribute by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterAttribute> {
        self.parameter_attributes
            .iter()
            .find(|attribute| attribute.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub attribute_path: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Filter {
    pub fn new(attribute_path: &str, operator: &str, value: Option<String>) -> Self {
        Self {
            attribute_path: attribute_path.to_string(),
            operator: operator.to_string(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub order: usize,
    pub delay_time: u32,
    pub destination_type: String,
    #[serde(default)]
    pub users: Vec<NamedRef>,
    #[serde(default)]
    pub functional_roles: Vec<NamedRef>,
    #[serde(default)]
    pub groups: Vec<NamedRef>,
    pub presence_config: String,
    pub recipient_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_path: Option<String>,
}

/// A `{ facilityName, name }` pair naming a unit, role, group or user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRef {
    pub facility_name: String,
    pub name: String,
}

impl NamedRef {
    pub fn new(facility_name: &str, name: &str) -> Self {
        Self {
            facility_name: facility_name.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interface {
    pub component_name: String,
    pub reference_name: String,
}

/// Interface parameter. `value` always holds a JSON token in string form:
/// business strings are stored quoted, booleans and numbers bare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterAttribute {
    pub name: String,
    pub value: String,
}

impl ParameterAttribute {
    /// Stores `text` as a JSON string literal, e.g. `"voceraAndDevice"`.
    pub fn quoted(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Value::String(text.to_string()).to_string(),
        }
    }

    /// Stores a bare JSON token such as `true` or `10`.
    pub fn literal(name: &str, token: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: token.to_string(),
        }
    }

    /// Decodes the stored token back into plain text. Quoted values lose their
    /// quotes; bare tokens are returned unchanged.
    pub fn text(&self) -> String {
        match serde_json::from_str::<Value>(&self.value) {
            Ok(Value::String(text)) => text,
            _ => self.value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_parameters_hold_json_string_literals() {
        let attribute = ParameterAttribute::quoted("breakThrough", "voceraAndDevice");
        assert_eq!(attribute.value, "\"voceraAndDevice\"");
        assert_eq!(attribute.text(), "voceraAndDevice");
    }

    #[test]
    fn literal_parameters_stay_bare() {
        let attribute = ParameterAttribute::literal("enunciate", true);
        assert_eq!(attribute.value, "true");
        assert_eq!(attribute.text(), "true");
    }
}
