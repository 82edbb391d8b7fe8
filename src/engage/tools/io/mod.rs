pub mod excel_read;
pub mod excel_write;
pub mod headers;
pub mod json;
pub mod xml_read;
