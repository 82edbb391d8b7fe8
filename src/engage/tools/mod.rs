pub mod assemble;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod sync;

pub use error::{Result, ToolError};
