use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::engage::tools::error::Result;
use crate::engage::tools::merge::MergeMode;
use crate::engage::tools::model::{FlowType, InterfaceKind};

/// Document version written when the configuration does not override it.
pub const DEFAULT_VERSION: &str = "1.1.0";

/// Session-wide settings for one load-then-export pass. The struct is built
/// once (from defaults, a TOML file and CLI overrides) and passed by reference
/// through the pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    pub merge_mode: MergeMode,
    /// Legacy boolean switch. When set it replaces `merge_mode`.
    pub merge_flows: Option<bool>,
    pub default_interfaces: DefaultInterfaces,
    pub reference_names: ReferenceNames,
    pub custom_tabs: Vec<CustomTab>,
    pub header_scan_rows: usize,
    pub version: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            merge_mode: MergeMode::None,
            merge_flows: None,
            default_interfaces: DefaultInterfaces::default(),
            reference_names: ReferenceNames::default(),
            custom_tabs: Vec::new(),
            header_scan_rows: 10,
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl ConverterConfig {
    /// Reads a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        let config: ConverterConfig = toml::from_str(&source)?;
        debug!(path = %path.display(), "loaded converter configuration");
        Ok(config)
    }

    /// Merge mode in effect once the legacy switch has been applied.
    pub fn effective_merge_mode(&self) -> MergeMode {
        self.merge_flows
            .map(MergeMode::from)
            .unwrap_or(self.merge_mode)
    }
}

/// Interfaces emitted for rows whose device columns resolve to nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultInterfaces {
    pub edge: bool,
    pub vmp: bool,
    pub vocera: bool,
    pub xmpp: bool,
}

impl DefaultInterfaces {
    /// Enabled defaults in output order.
    pub fn enabled(&self) -> Vec<InterfaceKind> {
        let flags = [
            (InterfaceKind::Edge, self.edge),
            (InterfaceKind::Vmp, self.vmp),
            (InterfaceKind::Vocera, self.vocera),
            (InterfaceKind::Xmpp, self.xmpp),
        ];
        flags
            .into_iter()
            .filter_map(|(kind, enabled)| enabled.then_some(kind))
            .collect()
    }
}

/// `referenceName` written for each interface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferenceNames {
    pub edge: String,
    pub vmp: String,
    pub vocera: String,
    pub xmpp: String,
}

impl Default for ReferenceNames {
    fn default() -> Self {
        Self {
            edge: InterfaceKind::Edge.component_name().to_string(),
            vmp: InterfaceKind::Vmp.component_name().to_string(),
            vocera: InterfaceKind::Vocera.component_name().to_string(),
            xmpp: InterfaceKind::Xmpp.component_name().to_string(),
        }
    }
}

impl ReferenceNames {
    pub fn for_kind(&self, kind: InterfaceKind) -> &str {
        match kind {
            InterfaceKind::Edge => &self.edge,
            InterfaceKind::Vmp => &self.vmp,
            InterfaceKind::Vocera => &self.vocera,
            InterfaceKind::Xmpp => &self.xmpp,
        }
    }
}

/// An extra sheet to read as the given flow type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomTab {
    pub sheet: String,
    pub flow_type: FlowType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_configuration() {
        let config: ConverterConfig = toml::from_str(
            r#"
            merge_mode = "by-config-group"
            header_scan_rows = 4

            [default_interfaces]
            vmp = true

            [reference_names]
            edge = "Edge Production"

            [[custom_tabs]]
            sheet = "ICU Monitors"
            flow_type = "clinicals"
            "#,
        )
        .expect("config parsed");

        assert_eq!(config.merge_mode, MergeMode::ByConfigGroup);
        assert_eq!(config.header_scan_rows, 4);
        assert_eq!(config.default_interfaces.enabled(), vec![InterfaceKind::Vmp]);
        assert_eq!(config.reference_names.edge, "Edge Production");
        assert_eq!(config.reference_names.vmp, "VMP");
        assert_eq!(config.custom_tabs[0].flow_type, FlowType::Clinicals);
        assert_eq!(config.version, DEFAULT_VERSION);
    }

    #[test]
    fn legacy_switch_overrides_merge_mode() {
        let config: ConverterConfig = toml::from_str(
            r#"
            merge_mode = "by-config-group"
            merge_flows = true
            "#,
        )
        .expect("config parsed");
        assert_eq!(config.effective_merge_mode(), MergeMode::AcrossConfigGroup);

        let config = ConverterConfig {
            merge_flows: Some(false),
            ..ConverterConfig::default()
        };
        assert_eq!(config.effective_merge_mode(), MergeMode::None);
    }
}
