pub mod engine;
pub mod layout;
pub mod types;
pub mod variants;

pub use engine::OcrEngine;
pub use layout::{extract_layout, LayoutElements};
pub use types::{ExtractionResult, OcrMethod, OcrToken, PageOcr};
pub use variants::PrepVariant;
