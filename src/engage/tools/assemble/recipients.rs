use crate::engage::tools::model::{Condition, Destination, Filter, NamedRef, Priority};

const ROLE_NAME_PATH: &str = "bed.room.unit.rooms.beds.locs.assignments.role.name";
const DEVICE_STATUS_PATH: &str = "bed.room.unit.rooms.beds.locs.assignments.usr.devices.status";
const UNIT_NAME_PATH: &str = "bed.room.unit.name";
const PRESENCE_PATH: &str = "bed.room.unit.rooms.beds.locs.assignments.usr.presence_show";
const CUSTOM_UNIT_TARGET_PATH: &str = "bed.room.unit.rooms.beds.locs.assignments.usr";

/// A parsed recipient cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Whoever is assigned the role to the patient's room.
    FunctionalRole(String),
    Group(String),
    /// Every caregiver on the unit holding one of the roles.
    CustomUnit(Vec<String>),
}

impl Recipient {
    /// Recipient cell text that parses back into `self`.
    pub fn to_cell_text(&self) -> String {
        match self {
            Recipient::FunctionalRole(role) => format!("VAssign:[Room] {role}"),
            Recipient::Group(group) => format!("VGroup: {group}"),
            Recipient::CustomUnit(roles) => format!("Custom Unit: {}", roles.join(", ")),
        }
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| text[prefix.len()..].trim_start_matches([':', ' ']).trim())
}

/// Parses recipient syntax: `VGroup: name`, `Custom Unit: role, role`,
/// `VAssign:[Room] role`, or a bare role name.
pub fn parse_recipient(text: &str) -> Option<Recipient> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(rest) = strip_prefix_ignore_case(text, "vgroup")
        .or_else(|| strip_prefix_ignore_case(text, "group:"))
    {
        return (!rest.is_empty()).then(|| Recipient::Group(rest.to_string()));
    }

    if let Some(rest) = strip_prefix_ignore_case(text, "custom unit") {
        let roles: Vec<String> = rest
            .split([',', ';'])
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(str::to_string)
            .collect();
        return (!roles.is_empty()).then_some(Recipient::CustomUnit(roles));
    }

    let role = match strip_prefix_ignore_case(text, "vassign") {
        Some(rest) => strip_prefix_ignore_case(rest, "[room]").unwrap_or(rest),
        None => text,
    };
    (!role.is_empty()).then(|| Recipient::FunctionalRole(role.to_string()))
}

/// Destination entry for one recipient slot.
pub fn destination(
    order: usize,
    delay_time: u32,
    recipient: &Recipient,
    facility: &str,
) -> Destination {
    let mut destination = Destination {
        order,
        delay_time,
        destination_type: "Normal".to_string(),
        users: Vec::new(),
        functional_roles: Vec::new(),
        groups: Vec::new(),
        presence_config: "user_and_device".to_string(),
        recipient_type: String::new(),
        attribute_path: None,
    };

    match recipient {
        Recipient::FunctionalRole(role) => {
            destination.functional_roles.push(NamedRef::new(facility, role));
            destination.recipient_type = "functional_role".to_string();
        }
        Recipient::Group(group) => {
            destination.groups.push(NamedRef::new(facility, group));
            destination.presence_config = "device".to_string();
            destination.recipient_type = "group".to_string();
        }
        Recipient::CustomUnit(roles) => {
            destination.functional_roles = roles
                .iter()
                .map(|role| NamedRef::new(facility, role))
                .collect();
            destination.recipient_type = "custom".to_string();
            destination.attribute_path = Some(CUSTOM_UNIT_TARGET_PATH.to_string());
        }
    }

    destination
}

/// Trailing destination for alerts nobody is assigned to.
pub fn no_caregiver_destination(order: usize, group: &str, facility: &str) -> Destination {
    Destination {
        order,
        delay_time: 0,
        destination_type: "NoDeliveries".to_string(),
        users: Vec::new(),
        functional_roles: Vec::new(),
        groups: vec![NamedRef::new(facility, group)],
        presence_config: "device".to_string(),
        recipient_type: "group".to_string(),
        attribute_path: None,
    }
}

/// Reverses [`destination`]: recovers the recipient a destination was built
/// from. `NoDeliveries` entries yield `None`.
pub fn recipient_of(destination: &Destination) -> Option<Recipient> {
    if destination.destination_type == "NoDeliveries" {
        return None;
    }
    match destination.recipient_type.as_str() {
        "group" => destination
            .groups
            .first()
            .map(|group| Recipient::Group(group.name.clone())),
        "custom" => {
            let roles: Vec<String> = destination
                .functional_roles
                .iter()
                .map(|role| role.name.clone())
                .collect();
            (!roles.is_empty()).then_some(Recipient::CustomUnit(roles))
        }
        _ => destination
            .functional_roles
            .first()
            .map(|role| Recipient::FunctionalRole(role.name.clone())),
    }
}

/// Role-membership condition for a custom unit slot. Urgent flows also
/// filter on caregiver presence.
pub fn custom_unit_condition(
    slot: usize,
    roles: &[String],
    units: &[NamedRef],
    priority: Priority,
) -> Condition {
    let unit_names: Vec<&str> = units.iter().map(|unit| unit.name.as_str()).collect();
    let mut filters = vec![
        Filter::new(ROLE_NAME_PATH, "in", Some(roles.join(", "))),
        Filter::new(DEVICE_STATUS_PATH, "equal", Some("Registered".to_string())),
        Filter::new(UNIT_NAME_PATH, "in", Some(unit_names.join(", "))),
    ];
    if priority == Priority::Urgent {
        filters.push(Filter::new(PRESENCE_PATH, "in", Some("chat, dnd".to_string())));
    }

    Condition {
        name: format!("Custom Unit {} Recipient", ordinal(slot + 1)),
        filters,
    }
}

/// `1` → `1st`, `2` → `2nd`, ...
pub fn ordinal(position: usize) -> String {
    let suffix = match (position % 10, position % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{position}{suffix}")
}
