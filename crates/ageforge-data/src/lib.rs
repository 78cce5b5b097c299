//! Ageforge Data -- loading, extraction and the conversion pipeline.
//!
//! Reads conversion inputs from RON/JSON/TOML files, extracts domain
//! objects from decoded game data and drives patch synthesis and link
//! validation. Build with the `parallel` feature to read record categories
//! concurrently.

pub mod extract;
pub mod grouping;
pub mod loader;
pub mod pipeline;
pub mod schema;

pub use extract::{ExtractError, ExtractReport, extract};
pub use loader::DataLoadError;
pub use pipeline::{Conversion, PipelineError, convert, convert_dir};
pub use schema::ConvertConfig;
