//! Page Normalizer: turns a document artifact into an ordered sequence of
//! pages, each carrying a native text layer, a raster image, or both.
//!
//! Pages are immutable once produced. PDF pages whose text layer already
//! clears the short-circuit threshold are never rasterized: the OCR engine
//! accepts the text layer directly, so rendering would be wasted work.

use image::RgbImage;

use super::format::{detect_format, FileCategory};
use super::NormalizeError;
use crate::capabilities::PdfRenderer;
use crate::config::{RASTER_SCALE, TEXT_LAYER_MIN_WORDS};

/// A document handed to the pipeline: display name plus raw bytes.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl DocumentInput {
    pub fn new(name: &str, bytes: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            bytes,
        }
    }
}

/// One normalized page. Immutable after creation.
#[derive(Debug, Clone)]
pub struct Page {
    /// Zero-based ordinal within the document.
    pub index: usize,
    /// Native text layer, when the source format carries one.
    pub text_layer: Option<String>,
    /// Decoded raster, present when the page may need raster OCR.
    pub raster: Option<RgbImage>,
}

impl Page {
    /// Whether the native text layer clears the short-circuit threshold.
    pub fn has_sufficient_text(&self) -> bool {
        self.text_layer
            .as_deref()
            .is_some_and(|t| t.split_whitespace().count() > TEXT_LAYER_MIN_WORDS)
    }
}

/// Normalize a document into ordered pages.
///
/// Images produce a single raster page; plain text produces a single
/// text-layer page; PDFs produce one page each, rasterized at the fixed
/// [`RASTER_SCALE`] only when the text layer is insufficient. A failed
/// render leaves that page empty but never aborts the document.
pub fn normalize(
    input: &DocumentInput,
    pdf: Option<&dyn PdfRenderer>,
) -> Result<Vec<Page>, NormalizeError> {
    let format = detect_format(&input.bytes);
    tracing::info!(
        document = %input.name,
        category = format.category.as_str(),
        size_bytes = format.size_bytes,
        "Normalizing document"
    );

    match format.category {
        FileCategory::Image => {
            let raster = image::load_from_memory(&input.bytes)
                .map_err(|e| NormalizeError::ImageDecode(e.to_string()))?
                .to_rgb8();
            Ok(vec![Page {
                index: 0,
                text_layer: None,
                raster: Some(raster),
            }])
        }

        FileCategory::PlainText => {
            let text = String::from_utf8_lossy(&input.bytes).into_owned();
            if text.trim().is_empty() {
                return Err(NormalizeError::EmptyDocument);
            }
            Ok(vec![Page {
                index: 0,
                text_layer: Some(text),
                raster: None,
            }])
        }

        FileCategory::Pdf => normalize_pdf(input, pdf),

        FileCategory::Unsupported => Err(NormalizeError::UnsupportedFormat(format.mime_type)),
    }
}

fn normalize_pdf(
    input: &DocumentInput,
    pdf: Option<&dyn PdfRenderer>,
) -> Result<Vec<Page>, NormalizeError> {
    let renderer = match pdf {
        Some(r) if r.available() => r,
        _ => return Err(NormalizeError::PdfBackendUnavailable),
    };

    let page_count = renderer.page_count(&input.bytes)?;
    if page_count == 0 {
        return Err(NormalizeError::EmptyDocument);
    }

    let mut pages = Vec::with_capacity(page_count);
    for index in 0..page_count {
        let text = match renderer.page_text(&input.bytes, index) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(page = index + 1, error = %e, "Text layer read failed");
                String::new()
            }
        };

        let sufficient = text.split_whitespace().count() > TEXT_LAYER_MIN_WORDS;
        let raster = if sufficient {
            None
        } else {
            match renderer
                .render_page(&input.bytes, index, RASTER_SCALE)
                .map_err(NormalizeError::from)
                .and_then(|png| {
                    image::load_from_memory(&png)
                        .map(|img| img.to_rgb8())
                        .map_err(|e| NormalizeError::ImageDecode(e.to_string()))
                }) {
                Ok(img) => Some(img),
                Err(e) => {
                    tracing::warn!(page = index + 1, error = %e, "Page rasterization failed");
                    None
                }
            }
        };

        pages.push(Page {
            index,
            text_layer: if text.is_empty() { None } else { Some(text) },
            raster,
        });
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::mock::{blank_png, MockPdfPage, MockPdfRenderer};

    #[test]
    fn image_becomes_single_raster_page() {
        let input = DocumentInput::new("scan.png", blank_png(32, 32));
        let pages = normalize(&input, None).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].raster.is_some());
        assert!(pages[0].text_layer.is_none());
    }

    #[test]
    fn plain_text_becomes_text_layer_page() {
        let input = DocumentInput::new("note.txt", b"Total: $42.00 due on 01/02/2024".to_vec());
        let pages = normalize(&input, None).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].has_sufficient_text());
        assert!(pages[0].raster.is_none());
    }

    #[test]
    fn pdf_text_pages_skip_rasterization() {
        let renderer = MockPdfRenderer {
            pages: vec![MockPdfPage::text_layer(
                "This page has plenty of native text available",
            )],
        };
        let input = DocumentInput::new("digital.pdf", b"%PDF-1.4 fake".to_vec());
        let pages = normalize(&input, Some(&renderer)).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].has_sufficient_text());
        assert!(pages[0].raster.is_none(), "sufficient text must not rasterize");
    }

    #[test]
    fn pdf_scanned_pages_rasterize() {
        let renderer = MockPdfRenderer {
            pages: vec![MockPdfPage::scanned()],
        };
        let input = DocumentInput::new("scan.pdf", b"%PDF-1.4 fake".to_vec());
        let pages = normalize(&input, Some(&renderer)).unwrap();
        assert!(pages[0].raster.is_some());
        assert!(!pages[0].has_sufficient_text());
    }

    #[test]
    fn pdf_mixed_pages_keep_order() {
        let renderer = MockPdfRenderer {
            pages: vec![
                MockPdfPage::text_layer("First page with a real text layer here"),
                MockPdfPage::scanned(),
            ],
        };
        let input = DocumentInput::new("mixed.pdf", b"%PDF-1.4 fake".to_vec());
        let pages = normalize(&input, Some(&renderer)).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].index, 0);
        assert_eq!(pages[1].index, 1);
        assert!(pages[0].raster.is_none());
        assert!(pages[1].raster.is_some());
    }

    #[test]
    fn pdf_without_renderer_is_unavailable() {
        let input = DocumentInput::new("scan.pdf", b"%PDF-1.4 fake".to_vec());
        let result = normalize(&input, None);
        assert!(matches!(result, Err(NormalizeError::PdfBackendUnavailable)));
    }

    #[test]
    fn failed_render_leaves_empty_page() {
        // Page with neither text nor a renderable raster.
        let renderer = MockPdfRenderer {
            pages: vec![MockPdfPage::default()],
        };
        let input = DocumentInput::new("bad.pdf", b"%PDF-1.4 fake".to_vec());
        let pages = normalize(&input, Some(&renderer)).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].raster.is_none());
        assert!(pages[0].text_layer.is_none());
    }

    #[test]
    fn unsupported_bytes_rejected() {
        let input = DocumentInput::new("app.exe", vec![0x4D, 0x5A, 0x90, 0x00, 0xFF]);
        let result = normalize(&input, None);
        assert!(matches!(result, Err(NormalizeError::UnsupportedFormat(_))));
    }

    #[test]
    fn short_text_layer_is_insufficient() {
        let page = Page {
            index: 0,
            text_layer: Some("Only three words".into()),
            raster: None,
        };
        assert!(!page.has_sufficient_text());
    }
}
