use std::fs;
use std::path::{Path, PathBuf};

use crate::engage::tools::assemble::assemble_document;
use crate::engage::tools::config::ConverterConfig;
use crate::engage::tools::error::Result;
use crate::engage::tools::io::excel_read;
use crate::engage::tools::io::excel_write;
use crate::engage::tools::io::json;
use crate::engage::tools::io::xml_read;
use crate::engage::tools::merge::group_rows;
use crate::engage::tools::model::{DeliveryFlowDocument, FlowType, ParsedWorkbook};
use tracing::{debug, info, instrument};

/// Groups and renders every flow type of a parsed source.
pub fn build_documents(
    parsed: &ParsedWorkbook,
    config: &ConverterConfig,
) -> Vec<(FlowType, DeliveryFlowDocument)> {
    let mode = config.effective_merge_mode();
    FlowType::ALL
        .into_iter()
        .map(|flow_type| {
            let groups = group_rows(parsed.rows(flow_type), mode);
            info!(
                %flow_type,
                rows = parsed.rows(flow_type).len(),
                groups = groups.len(),
                ?mode,
                "grouped rows into flows"
            );
            let document = assemble_document(flow_type, &groups, &parsed.units, config);
            (flow_type, document)
        })
        .collect()
}

/// Converts an alert-routing workbook into one JSON document per flow type.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output_dir.display())
)]
pub fn excel_to_json(
    input: &Path,
    output_dir: &Path,
    config: &ConverterConfig,
) -> Result<Vec<PathBuf>> {
    let parsed = excel_read::read_workbook(input, config)?;
    info!(rows = parsed.row_count(), "read rows from workbook");
    write_documents(&parsed, output_dir, config)
}

/// Converts a legacy XML rule package into one JSON document per flow type.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output_dir.display())
)]
pub fn xml_to_json(
    input: &Path,
    output_dir: &Path,
    config: &ConverterConfig,
) -> Result<Vec<PathBuf>> {
    let parsed = xml_read::read_package(input, config)?;
    info!(rows = parsed.row_count(), "read rows from rule package");
    write_documents(&parsed, output_dir, config)
}

/// Exports a generated delivery-flow document back into a workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn json_to_excel(input: &Path, output: &Path) -> Result<()> {
    let document = json::read_document(input)?;
    let flow_type = json::document_flow_type(&document, input);
    let parsed = json::document_to_workbook(&document, flow_type);
    info!(%flow_type, rows = parsed.row_count(), "recovered rows from document");
    let workbook = excel_write::build_workbook(&parsed);
    debug!(sheet_count = workbook.tables.len(), "workbook constructed");
    excel_write::write_workbook(output, &workbook)
}

/// Exports a legacy XML rule package as an alert-routing workbook.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn xml_to_excel(input: &Path, output: &Path, config: &ConverterConfig) -> Result<()> {
    let parsed = xml_read::read_package(input, config)?;
    let workbook = excel_write::build_workbook(&parsed);
    debug!(sheet_count = workbook.tables.len(), "workbook constructed");
    excel_write::write_workbook(output, &workbook)
}

/// Re-exports an alert-routing workbook with canonical sheets and headers.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn excel_to_excel(input: &Path, output: &Path, config: &ConverterConfig) -> Result<()> {
    let parsed = excel_read::read_workbook(input, config)?;
    let workbook = excel_write::build_workbook(&parsed);
    debug!(sheet_count = workbook.tables.len(), "workbook constructed");
    excel_write::write_workbook(output, &workbook)
}

#[instrument(level = "debug", skip(parsed, config), fields(output = %output_dir.display()))]
fn write_documents(
    parsed: &ParsedWorkbook,
    output_dir: &Path,
    config: &ConverterConfig,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();
    for (flow_type, document) in build_documents(parsed, config) {
        let path = output_dir.join(flow_type.file_name());
        json::write_document(&path, &document)?;
        debug!(path = %path.display(), flows = document.delivery_flows.len(), "document written");
        written.push(path);
    }
    Ok(written)
}
