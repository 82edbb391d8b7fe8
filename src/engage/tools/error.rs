use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the failure cases that can occur when the tool
/// ingests, transforms, or emits alert-routing data.
///
/// Malformed cells, unknown devices and missing columns are not errors: the
/// pipeline degrades to empty or default values for those. Only unreadable
/// sources and structurally wrong documents surface here.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a legacy rule package is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Raised when the TOML configuration file cannot be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Raised when a JSON input is not a delivery-flow document.
    #[error("invalid delivery-flow document: {0}")]
    InvalidDocument(String),

    /// Raised when an XML input does not follow the rule package layout.
    #[error("invalid rule package: {0}")]
    InvalidPackage(String),

    /// Raised when the CLI receives an unsupported conversion request.
    #[error("unsupported conversion from {from:?} to {to:?}")]
    UnsupportedConversion { from: String, to: String },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
