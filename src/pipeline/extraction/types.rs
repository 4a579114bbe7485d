use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::variants::PrepVariant;
use crate::capabilities::BoundingQuad;

/// One recognized token. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrToken {
    pub text: String,
    pub quad: BoundingQuad,
    /// Confidence in [0, 1].
    pub confidence: f32,
}

/// How a page's (or document's) text was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrMethod {
    /// Native text layer accepted directly (short-circuit).
    TextLayer,
    /// Raster OCR through a recognition backend.
    RasterOcr,
    /// Every strategy failed or produced nothing for this page.
    Empty,
    /// No recognition backend configured; explicit degraded marker.
    Unavailable,
}

impl OcrMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextLayer => "text_layer",
            Self::RasterOcr => "raster_ocr",
            Self::Empty => "empty",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Per-page extraction result with strategy provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOcr {
    /// One-based page number.
    pub page_number: usize,
    pub text: String,
    pub tokens: Vec<OcrToken>,
    pub confidence: f32,
    pub method: OcrMethod,
    /// Winning preprocessing variant, for raster OCR pages.
    pub variant: Option<PrepVariant>,
    /// Winning backend recognition profile, for raster OCR pages.
    pub profile: Option<String>,
}

/// Document-level extraction result.
///
/// `word_count` always equals the number of whitespace-separated units in
/// `full_text` (page markers included).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub document_id: Uuid,
    pub full_text: String,
    pub tokens: Vec<OcrToken>,
    pub word_count: usize,
    /// Mean confidence over pages that produced text.
    pub confidence: f32,
    pub method: OcrMethod,
    pub pages: Vec<PageOcr>,
}

impl ExtractionResult {
    /// Explicit degraded result when no recognition backend is configured.
    /// Never an error: the caller sees an empty, clearly tagged result.
    pub fn unavailable(document_id: Uuid, pages: Vec<PageOcr>) -> Self {
        Self {
            document_id,
            full_text: String::new(),
            tokens: Vec::new(),
            word_count: 0,
            confidence: 0.0,
            method: OcrMethod::Unavailable,
            pages,
        }
    }
}
