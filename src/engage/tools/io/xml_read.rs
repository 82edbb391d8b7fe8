//! Legacy XML rule packages.
//!
//! A package declares datasets whose views hold `(path, relation, value)`
//! filters, and interfaces whose send rules reference those views and carry
//! a JSON `settings` blob. Rules that target the same alarms and units
//! through one interface form an escalation chain ordered by their deferral.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use roxmltree::{Document, Node};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::engage::tools::assemble::Recipient;
use crate::engage::tools::config::ConverterConfig;
use crate::engage::tools::error::{Result, ToolError};
use crate::engage::tools::model::{
    FlowType, InterfaceKind, ParsedWorkbook, RECIPIENT_SLOTS, RawRow, UnitRow,
};
use crate::engage::tools::normalize::{BREAK_THROUGH_ALL, BREAK_THROUGH_NONE, normalize_row};

/// One `<filter>` of a dataset view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFilter {
    pub path: String,
    pub relation: String,
    pub value: String,
}

impl ViewFilter {
    /// Filter values; `in` relations list several, comma separated.
    pub fn values(&self) -> Vec<String> {
        if self.relation.trim().eq_ignore_ascii_case("in") {
            self.value
                .split(',')
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            let value = self.value.trim();
            if value.is_empty() {
                Vec::new()
            } else {
                vec![value.to_string()]
            }
        }
    }
}

#[derive(Debug, Clone)]
struct SendRule {
    flow_type: FlowType,
    dataset: String,
    component: String,
    alarms: Vec<String>,
    units: Vec<String>,
    facility: String,
    roles: Vec<String>,
    defer_seconds: u32,
    settings: Map<String, Value>,
}

impl SendRule {
    fn chain_key(&self) -> (FlowType, &str, &str, &[String], &[String], &str) {
        (
            self.flow_type,
            self.dataset.as_str(),
            self.component.as_str(),
            self.alarms.as_slice(),
            self.units.as_slice(),
            self.facility.as_str(),
        )
    }
}

/// Reads a rule package from disk.
pub fn read_package(path: &Path, config: &ConverterConfig) -> Result<ParsedWorkbook> {
    let source = fs::read_to_string(path)?;
    parse_package(&source, config)
}

/// Parses rule package XML into units and normalised rows.
pub fn parse_package(source: &str, config: &ConverterConfig) -> Result<ParsedWorkbook> {
    let document = Document::parse(source)?;
    let root = document.root_element();
    if !root.has_tag_name("package") {
        return Err(ToolError::InvalidPackage(format!(
            "expected <package> root, found <{}>",
            root.tag_name().name()
        )));
    }

    let views = collect_views(root);
    let rules = collect_rules(root, &views);
    let chains = build_chains(rules);

    let mut parsed = ParsedWorkbook::default();
    let defaults = config.default_interfaces.enabled();
    for chain in &chains {
        for raw in chain_rows(chain, &mut parsed.units) {
            parsed
                .rows_mut(chain[0].flow_type)
                .push(normalize_row(&raw, &defaults));
        }
    }

    info!(
        chains = chains.len(),
        units = parsed.units.len(),
        rows = parsed.row_count(),
        "rule package loaded"
    );
    Ok(parsed)
}

fn is_active(node: Node) -> bool {
    node.attribute("active")
        .is_none_or(|active| !active.trim().eq_ignore_ascii_case("false"))
}

fn child_text(node: Node, name: &str) -> String {
    node.children()
        .find(|child| child.has_tag_name(name))
        .and_then(|child| child.text())
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}

fn dataset_flow_type(name: &str) -> Option<FlowType> {
    let folded = name.to_lowercase();
    if folded.contains("nurse") {
        Some(FlowType::NurseCalls)
    } else if folded.contains("clinical") {
        Some(FlowType::Clinicals)
    } else if folded.contains("order") {
        Some(FlowType::Orders)
    } else {
        None
    }
}

type ViewMap = HashMap<(String, String), Vec<ViewFilter>>;

fn collect_views(root: Node) -> ViewMap {
    let mut views = ViewMap::new();
    for dataset in root.descendants().filter(|node| node.has_tag_name("dataset")) {
        if !is_active(dataset) {
            continue;
        }
        let dataset_name = child_text(dataset, "name");
        for view in dataset.children().filter(|node| node.has_tag_name("view")) {
            let filters = view
                .children()
                .filter(|node| node.has_tag_name("filter"))
                .map(|filter| ViewFilter {
                    path: child_text(filter, "path"),
                    relation: filter.attribute("relation").unwrap_or("equal").to_string(),
                    value: child_text(filter, "value"),
                })
                .collect();
            views.insert((dataset_name.clone(), child_text(view, "name")), filters);
        }
    }
    views
}

fn collect_rules(root: Node, views: &ViewMap) -> Vec<SendRule> {
    let mut rules = Vec::new();
    for interface in root.descendants().filter(|node| node.has_tag_name("interface")) {
        let component = interface.attribute("component").unwrap_or_default().trim();
        for rule in interface.children().filter(|node| node.has_tag_name("rule")) {
            if !is_active(rule) {
                continue;
            }
            let dataset = rule.attribute("dataset").unwrap_or_default().trim().to_string();
            let Some(flow_type) = dataset_flow_type(&dataset) else {
                debug!(%dataset, "rule for unknown dataset skipped");
                continue;
            };

            let mut send_rule = SendRule {
                flow_type,
                dataset: dataset.clone(),
                component: component.to_string(),
                alarms: Vec::new(),
                units: Vec::new(),
                facility: String::new(),
                roles: Vec::new(),
                defer_seconds: child_text(rule, "defer-delivery-by").parse().unwrap_or(0),
                settings: parse_settings(&child_text(rule, "settings")),
            };

            let view_names = rule
                .children()
                .filter(|node| node.has_tag_name("condition"))
                .flat_map(|condition| condition.children().filter(|node| node.has_tag_name("view")))
                .filter_map(|view| view.text())
                .map(|name| name.trim().to_string());
            for view_name in view_names {
                let Some(filters) = views.get(&(dataset.clone(), view_name.clone())) else {
                    debug!(view = %view_name, "rule references unknown view");
                    continue;
                };
                apply_filters(&mut send_rule, filters);
            }

            if send_rule.alarms.is_empty() {
                debug!(purpose = %child_text(rule, "purpose"), "rule without alarm filter skipped");
                continue;
            }
            rules.push(send_rule);
        }
    }
    rules
}

fn apply_filters(rule: &mut SendRule, filters: &[ViewFilter]) {
    for filter in filters {
        let path = filter.path.trim();
        let target = if path.ends_with("alert_type") || path.ends_with("alarm_name") {
            &mut rule.alarms
        } else if path.ends_with("unit.name") {
            &mut rule.units
        } else if path.ends_with("role.name") {
            &mut rule.roles
        } else if path.ends_with("facility.name") {
            if let Some(facility) = filter.values().into_iter().next() {
                rule.facility = facility;
            }
            continue;
        } else {
            continue;
        };
        for value in filter.values() {
            if !target.contains(&value) {
                target.push(value);
            }
        }
    }
}

fn parse_settings(text: &str) -> Map<String, Value> {
    if text.is_empty() {
        return Map::new();
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            warn!("rule settings are not a JSON object, ignored");
            Map::new()
        }
    }
}

/// Groups rules into escalation chains in first-seen order, each sorted by
/// deferral.
fn build_chains(rules: Vec<SendRule>) -> Vec<Vec<SendRule>> {
    let mut chains: Vec<Vec<SendRule>> = Vec::new();
    for rule in rules {
        match chains
            .iter_mut()
            .find(|chain| chain[0].chain_key() == rule.chain_key())
        {
            Some(chain) => chain.push(rule),
            None => chains.push(vec![rule]),
        }
    }
    for chain in &mut chains {
        chain.sort_by_key(|rule| rule.defer_seconds);
    }
    chains
}

fn setting_text(settings: &Map<String, Value>, key: &str) -> Option<String> {
    match settings.get(key)? {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn priority_text(settings: &Map<String, Value>) -> String {
    match setting_text(settings, "priority").as_deref() {
        Some("0") => "Normal".to_string(),
        Some("1") => "High".to_string(),
        Some("2") => "Urgent".to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn break_through_text(settings: &Map<String, Value>) -> String {
    if let Some(text) = setting_text(settings, "breakThrough") {
        return text;
    }
    match settings.get("overrideDND") {
        Some(Value::Bool(true)) => BREAK_THROUGH_ALL.to_string(),
        Some(Value::Bool(false)) => BREAK_THROUGH_NONE.to_string(),
        _ => String::new(),
    }
}

fn response_options_text(settings: &Map<String, Value>) -> String {
    let Some(Value::Array(values)) = settings.get("displayValues") else {
        return String::new();
    };
    values
        .iter()
        .filter_map(Value::as_str)
        .map(|value| {
            if value.trim().eq_ignore_ascii_case("decline") {
                "Escalate"
            } else {
                value.trim()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn rule_recipient(rule: &SendRule) -> Option<Recipient> {
    match rule.roles.as_slice() {
        [] => match rule.settings.get("groups") {
            Some(Value::Array(groups)) => groups
                .iter()
                .find_map(Value::as_str)
                .map(|group| Recipient::Group(group.trim().to_string())),
            _ => None,
        },
        [role] => Some(Recipient::FunctionalRole(role.clone())),
        roles => Some(Recipient::CustomUnit(roles.to_vec())),
    }
}

fn config_group_name(facility: &str, unit: &str, dataset: &str) -> String {
    [facility, unit, dataset]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Rows for every alarm and unit of a chain. Registers the chain's units.
fn chain_rows(chain: &[SendRule], units: &mut Vec<UnitRow>) -> Vec<RawRow> {
    let head = &chain[0];
    let settings = &head.settings;

    let mut recipients: [String; RECIPIENT_SLOTS] = Default::default();
    let mut timings: [String; RECIPIENT_SLOTS] = Default::default();
    for (slot, rule) in chain.iter().take(RECIPIENT_SLOTS).enumerate() {
        if let Some(recipient) = rule_recipient(rule) {
            recipients[slot] = recipient.to_cell_text();
        }
        if rule.defer_seconds > 0 {
            timings[slot] = rule.defer_seconds.to_string();
        }
    }
    if chain.len() > RECIPIENT_SLOTS {
        warn!(
            dataset = %head.dataset,
            rules = chain.len(),
            "escalation chain longer than the recipient slots, extra rules dropped"
        );
    }

    let device = InterfaceKind::from_component_name(&head.component)
        .map(|kind| kind.device_name().to_string())
        .unwrap_or_else(|| head.component.clone());
    let ringtone = setting_text(settings, "badgeAlertSound")
        .or_else(|| setting_text(settings, "alertSound"))
        .unwrap_or_default();
    let enunciate = match settings.get("enunciate") {
        Some(Value::Bool(true)) => "Yes".to_string(),
        Some(Value::Bool(false)) => "No".to_string(),
        _ => setting_text(settings, "enunciate").unwrap_or_default(),
    };

    let unit_names: Vec<&str> = if head.units.is_empty() {
        vec![""]
    } else {
        head.units.iter().map(String::as_str).collect()
    };

    let mut rows = Vec::new();
    for unit in unit_names {
        let config_group = config_group_name(&head.facility, unit, &head.dataset);
        if !unit.is_empty() {
            register_unit(units, &head.facility, unit, head.flow_type, &config_group);
        }
        for alarm in &head.alarms {
            rows.push(RawRow {
                config_group: config_group.clone(),
                alarm_name: alarm.clone(),
                sending_name: alarm.clone(),
                priority: priority_text(settings),
                device_a: device.clone(),
                ringtone: ringtone.clone(),
                response_options: response_options_text(settings),
                break_through_dnd: break_through_text(settings),
                enunciate: enunciate.clone(),
                recipients: recipients.clone(),
                timings: timings.clone(),
                ..RawRow::default()
            });
        }
    }
    rows
}

fn register_unit(
    units: &mut Vec<UnitRow>,
    facility: &str,
    name: &str,
    flow_type: FlowType,
    config_group: &str,
) {
    let position = match units
        .iter()
        .position(|unit| unit.facility == facility && unit.name == name)
    {
        Some(position) => position,
        None => {
            units.push(UnitRow {
                facility: facility.to_string(),
                name: name.to_string(),
                ..UnitRow::default()
            });
            units.len() - 1
        }
    };
    let group = units[position].config_group_mut(flow_type);
    if group.is_empty() {
        *group = config_group.to_string();
    }
}
