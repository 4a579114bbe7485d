//! OCR Extraction Engine: per-page strategy selection with graceful fallback.
//!
//! Strategy order per page:
//! 1. Text-layer short-circuit: native text above the word threshold is
//!    accepted at a fixed high confidence, no raster OCR runs at all.
//! 2. Raster OCR: every preprocessing variant x backend profile is tried
//!    and the single combination producing the most non-whitespace text
//!    wins (greedy selection, not an ensemble).
//!
//! A failed variant is skipped; a page where everything fails contributes
//! empty text; a missing backend yields an explicit unavailable result.
//! Nothing here ever aborts the document.

use std::sync::Arc;

use image::RgbImage;
use uuid::Uuid;

use super::types::{ExtractionResult, OcrMethod, OcrToken, PageOcr};
use super::variants::PrepVariant;
use crate::capabilities::OcrBackend;
use crate::config::{TEXT_LAYER_CONFIDENCE, TOKEN_CONFIDENCE_FLOOR};
use crate::document::Page;

pub struct OcrEngine {
    backend: Option<Arc<dyn OcrBackend>>,
}

/// Winning variant/profile combination for one page.
struct VariantSelection {
    variant: PrepVariant,
    profile: String,
    tokens: Vec<OcrToken>,
    text: String,
    confidence: f32,
    /// Non-whitespace character count, the greedy selection criterion.
    score: usize,
}

impl OcrEngine {
    pub fn new(backend: Option<Arc<dyn OcrBackend>>) -> Self {
        Self { backend }
    }

    fn backend(&self) -> Option<&dyn OcrBackend> {
        self.backend.as_deref().filter(|b| b.available())
    }

    /// Extract text from every page and aggregate the document result.
    pub fn extract_document(&self, document_id: Uuid, pages: &[Page]) -> ExtractionResult {
        let page_results: Vec<PageOcr> = pages.iter().map(|p| self.extract_page(p)).collect();

        let produced_text = page_results.iter().any(|p| !p.text.trim().is_empty());
        let any_unavailable = page_results
            .iter()
            .any(|p| p.method == OcrMethod::Unavailable);

        if !produced_text && any_unavailable {
            tracing::warn!(
                document_id = %document_id,
                "No OCR backend configured and no text layer, returning unavailable result"
            );
            return ExtractionResult::unavailable(document_id, page_results);
        }

        let mut full_text = String::new();
        let mut tokens = Vec::new();
        let mut confidence_sum = 0.0f32;
        let mut text_pages = 0usize;

        for page in &page_results {
            if page.text.trim().is_empty() {
                continue;
            }
            full_text.push_str(&format!("\n=== PAGE {} ===\n", page.page_number));
            full_text.push_str(&page.text);
            tokens.extend(page.tokens.iter().cloned());
            confidence_sum += page.confidence;
            text_pages += 1;
        }

        let word_count = full_text.split_whitespace().count();
        let confidence = if text_pages > 0 {
            confidence_sum / text_pages as f32
        } else {
            0.0
        };

        let method = if page_results
            .iter()
            .any(|p| p.method == OcrMethod::RasterOcr)
        {
            OcrMethod::RasterOcr
        } else if page_results.iter().any(|p| p.method == OcrMethod::TextLayer) {
            OcrMethod::TextLayer
        } else {
            OcrMethod::Empty
        };

        tracing::info!(
            document_id = %document_id,
            method = method.as_str(),
            pages = page_results.len(),
            words = word_count,
            confidence,
            "Extraction complete"
        );

        ExtractionResult {
            document_id,
            full_text,
            tokens,
            word_count,
            confidence,
            method,
            pages: page_results,
        }
    }

    fn extract_page(&self, page: &Page) -> PageOcr {
        let page_number = page.index + 1;

        // Text-layer short-circuit: no rasterization, no backend call.
        if page.has_sufficient_text() {
            let text = page.text_layer.clone().unwrap_or_default();
            return PageOcr {
                page_number,
                text,
                tokens: Vec::new(),
                confidence: TEXT_LAYER_CONFIDENCE,
                method: OcrMethod::TextLayer,
                variant: None,
                profile: None,
            };
        }

        let Some(raster) = &page.raster else {
            return empty_page(page_number, OcrMethod::Empty);
        };

        let Some(backend) = self.backend() else {
            tracing::warn!(page = page_number, "No OCR backend available for raster page");
            return empty_page(page_number, OcrMethod::Unavailable);
        };

        match self.best_variant(backend, raster, page_number) {
            Some(sel) => PageOcr {
                page_number,
                text: sel.text,
                tokens: sel.tokens,
                confidence: sel.confidence,
                method: OcrMethod::RasterOcr,
                variant: Some(sel.variant),
                profile: Some(sel.profile),
            },
            None => empty_page(page_number, OcrMethod::Empty),
        }
    }

    /// Try every preprocessing variant × recognition profile; keep the one
    /// with the most non-whitespace text. Ties keep the earlier combination.
    fn best_variant(
        &self,
        backend: &dyn OcrBackend,
        image: &RgbImage,
        page_number: usize,
    ) -> Option<VariantSelection> {
        let profiles = backend.profiles();
        let mut best: Option<VariantSelection> = None;

        for variant in PrepVariant::ALL {
            let processed = variant.apply(image);
            for profile in &profiles {
                let words = match backend.recognize(&processed, profile) {
                    Ok(words) => words,
                    Err(e) => {
                        tracing::warn!(
                            page = page_number,
                            variant = variant.as_str(),
                            profile = profile.as_str(),
                            error = %e,
                            "OCR variant failed, skipping"
                        );
                        continue;
                    }
                };

                let tokens: Vec<OcrToken> = words
                    .into_iter()
                    .filter(|w| w.confidence >= TOKEN_CONFIDENCE_FLOOR && !w.text.trim().is_empty())
                    .map(|w| OcrToken {
                        text: w.text.trim().to_string(),
                        quad: w.quad,
                        confidence: w.confidence,
                    })
                    .collect();
                if tokens.is_empty() {
                    continue;
                }

                let text = tokens
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let score = text.chars().filter(|c| !c.is_whitespace()).count();
                let confidence =
                    tokens.iter().map(|t| t.confidence).sum::<f32>() / tokens.len() as f32;

                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(VariantSelection {
                        variant,
                        profile: profile.clone(),
                        tokens,
                        text,
                        confidence,
                        score,
                    });
                }
            }
        }

        if let Some(sel) = &best {
            tracing::debug!(
                page = page_number,
                variant = sel.variant.as_str(),
                profile = sel.profile.as_str(),
                chars = sel.score,
                "Selected OCR variant"
            );
        }
        best
    }
}

fn empty_page(page_number: usize, method: OcrMethod) -> PageOcr {
    PageOcr {
        page_number,
        text: String::new(),
        tokens: Vec::new(),
        confidence: 0.0,
        method,
        variant: None,
        profile: None,
    }
}
