//! Core library for the engage-tools command line application.
//!
//! The library turns alert-routing workbooks and legacy XML rule packages
//! into the delivery-flow JSON documents consumed by the Engage platform, and
//! exports those documents back into spreadsheet form. Responsibilities are
//! kept narrow: IO adapters live under [`engage::tools::io`], the row and
//! document representations inside [`engage::tools::model`], vocabulary
//! normalisation in [`engage::tools::normalize`], flow grouping under
//! [`engage::tools::merge`], document rendering in [`engage::tools::assemble`],
//! and the end-to-end orchestration under [`engage::tools::sync`].

pub mod engage;

pub use engage::tools::{
    Result, ToolError, assemble, config, error, io, merge, model, normalize, sync,
};
