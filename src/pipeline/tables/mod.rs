//! Table Detection & Parsing Engine.
//!
//! Raster pages go through morphological line detection to find candidate
//! grid regions, which are then OCRed and parsed into rows. Text-layer
//! pages skip detection and parse their text directly. Either way a table
//! only counts if it has a header row plus at least one data row.

mod detect;
mod engine;
mod parse;
mod types;

pub use detect::{detect_regions, BINARIZE_THRESHOLD, LINE_RUN_LENGTH, MIN_REGION_AREA};
pub use engine::TableEngine;
pub use parse::{parse_table_text, parse_text_block, split_columns};
pub use types::{TableRecord, TableRegion, TableSource};
