//! Injected capability interfaces.
//!
//! Every external recognition/inference ability the pipeline consumes is a
//! trait defined here: raster OCR backends, PDF rendering, abstractive
//! summarization, extractive QA, and named-entity recognition. A capability
//! may report itself unavailable at startup via `available()`; the owning
//! stage then degrades gracefully instead of failing the pipeline.
//!
//! Mock implementations live in [`mock`] and are used throughout the test
//! suite (and are handy for host applications wiring up the pipeline before
//! real backends exist).

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("capability unavailable: {0}")]
    Unavailable(&'static str),

    #[error("backend error: {0}")]
    Backend(String),
}

/// One corner of a recognized token's bounding quad, in raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadPoint {
    pub x: f32,
    pub y: f32,
}

/// Four-point bounding quad, ordered top-left, top-right, bottom-right,
/// bottom-left. Quads (not axis-aligned boxes) because OCR backends report
/// rotated text regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingQuad {
    pub points: [QuadPoint; 4],
}

impl BoundingQuad {
    /// Axis-aligned quad from a rectangle.
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            points: [
                QuadPoint { x, y },
                QuadPoint { x: x + width, y },
                QuadPoint { x: x + width, y: y + height },
                QuadPoint { x, y: y + height },
            ],
        }
    }

    /// Vertical center of the quad, used for line grouping.
    pub fn center_y(&self) -> f32 {
        self.points.iter().map(|p| p.y).sum::<f32>() / 4.0
    }

    /// Leftmost x coordinate, used for left-to-right ordering.
    pub fn left(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.x)
            .fold(f32::INFINITY, f32::min)
    }

    /// Rightmost x coordinate.
    pub fn right(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.x)
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// One recognized token from a raster OCR backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizedWord {
    pub text: String,
    pub quad: BoundingQuad,
    /// Backend confidence in [0, 1].
    pub confidence: f32,
}

/// Raster OCR backend: image in, recognized tokens out.
///
/// Backends that expose multiple recognition configurations (page
/// segmentation modes, engine variants) list them via `profiles()`; the
/// extraction engine tries every preprocessing-variant × profile combination
/// and greedily keeps the one yielding the most text.
pub trait OcrBackend: Send + Sync {
    fn available(&self) -> bool {
        true
    }

    /// Recognition profile names. Single-mode backends return one entry.
    fn profiles(&self) -> Vec<String> {
        vec!["default".to_string()]
    }

    fn recognize(
        &self,
        image: &RgbImage,
        profile: &str,
    ) -> Result<Vec<RecognizedWord>, CapabilityError>;
}

/// PDF access: page count, native text layer, and page rasterization.
///
/// `render_page` returns encoded PNG bytes at the given upscaling factor
/// (1.0 = natural page size).
pub trait PdfRenderer: Send + Sync {
    fn available(&self) -> bool {
        true
    }

    fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize, CapabilityError>;

    fn page_text(&self, pdf_bytes: &[u8], page_index: usize) -> Result<String, CapabilityError>;

    fn render_page(
        &self,
        pdf_bytes: &[u8],
        page_index: usize,
        scale: f32,
    ) -> Result<Vec<u8>, CapabilityError>;
}

/// Abstractive summarization capability, bounded in output length.
pub trait Summarizer: Send + Sync {
    fn available(&self) -> bool {
        true
    }

    fn summarize(
        &self,
        text: &str,
        min_words: usize,
        max_words: usize,
    ) -> Result<String, CapabilityError>;
}

/// Answer produced by an extractive QA model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractiveAnswer {
    pub text: String,
    /// Model score in [0, 1].
    pub score: f32,
}

/// Extractive question answering over a context passage.
pub trait ExtractiveQa: Send + Sync {
    fn available(&self) -> bool {
        true
    }

    fn answer(&self, question: &str, context: &str) -> Result<ExtractiveAnswer, CapabilityError>;
}

/// A named entity with byte offsets into the analyzed text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedEntity {
    pub text: String,
    /// Entity label, e.g. "PERSON", "DATE", "MONEY", "GPE".
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// Named-entity recognition capability.
pub trait NerBackend: Send + Sync {
    fn available(&self) -> bool {
        true
    }

    fn entities(&self, text: &str) -> Result<Vec<NamedEntity>, CapabilityError>;
}

/// Mock capabilities for unit testing without real models.
pub mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Mock OCR backend returning a fixed word list per call.
    ///
    /// Words are laid out left-to-right on synthetic lines (one input line =
    /// one raster line, 40px apart) so spatial grouping behaves as it would
    /// on real output. Tracks how many times `recognize` was invoked, which
    /// lets tests assert the text-layer short-circuit.
    pub struct MockOcrBackend {
        lines: Vec<Vec<String>>,
        confidence: f32,
        calls: AtomicUsize,
    }

    impl MockOcrBackend {
        pub fn new(text: &str, confidence: f32) -> Self {
            let lines = text
                .lines()
                .map(|l| l.split_whitespace().map(str::to_string).collect())
                .collect();
            Self {
                lines,
                confidence,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn recognize_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl OcrBackend for MockOcrBackend {
        fn recognize(
            &self,
            _image: &RgbImage,
            _profile: &str,
        ) -> Result<Vec<RecognizedWord>, CapabilityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut words = Vec::new();
            for (row, line) in self.lines.iter().enumerate() {
                let mut x = 10.0;
                let y = 20.0 + row as f32 * 40.0;
                for word in line {
                    let width = 14.0 * word.len() as f32;
                    words.push(RecognizedWord {
                        text: word.clone(),
                        quad: BoundingQuad::from_rect(x, y, width, 24.0),
                        confidence: self.confidence,
                    });
                    x += width + 14.0;
                }
            }
            Ok(words)
        }
    }

    /// Mock OCR backend that always errors, for failure-isolation tests.
    pub struct FailingOcrBackend;

    impl OcrBackend for FailingOcrBackend {
        fn recognize(
            &self,
            _image: &RgbImage,
            _profile: &str,
        ) -> Result<Vec<RecognizedWord>, CapabilityError> {
            Err(CapabilityError::Backend("recognition crashed".into()))
        }
    }

    /// One mock PDF page: a text layer and/or a rendered raster.
    #[derive(Clone, Default)]
    pub struct MockPdfPage {
        pub text: String,
        pub png: Option<Vec<u8>>,
    }

    impl MockPdfPage {
        pub fn text_layer(text: &str) -> Self {
            Self {
                text: text.to_string(),
                png: None,
            }
        }

        pub fn scanned() -> Self {
            Self {
                text: String::new(),
                png: Some(blank_png(64, 64)),
            }
        }
    }

    /// Mock PDF renderer serving a fixed page list regardless of input bytes.
    pub struct MockPdfRenderer {
        pub pages: Vec<MockPdfPage>,
    }

    impl PdfRenderer for MockPdfRenderer {
        fn page_count(&self, _pdf_bytes: &[u8]) -> Result<usize, CapabilityError> {
            Ok(self.pages.len())
        }

        fn page_text(
            &self,
            _pdf_bytes: &[u8],
            page_index: usize,
        ) -> Result<String, CapabilityError> {
            self.pages
                .get(page_index)
                .map(|p| p.text.clone())
                .ok_or_else(|| CapabilityError::Backend(format!("no page {page_index}")))
        }

        fn render_page(
            &self,
            _pdf_bytes: &[u8],
            page_index: usize,
            _scale: f32,
        ) -> Result<Vec<u8>, CapabilityError> {
            self.pages
                .get(page_index)
                .and_then(|p| p.png.clone())
                .ok_or_else(|| CapabilityError::Backend(format!("page {page_index} not rendered")))
        }
    }

    /// Mock summarizer echoing a canned reply, or failing when configured to.
    pub struct MockSummarizer {
        pub reply: String,
        pub fail: bool,
    }

    impl MockSummarizer {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: String::new(),
                fail: true,
            }
        }
    }

    impl Summarizer for MockSummarizer {
        fn summarize(
            &self,
            _text: &str,
            _min_words: usize,
            _max_words: usize,
        ) -> Result<String, CapabilityError> {
            if self.fail {
                Err(CapabilityError::Backend("summarization failed".into()))
            } else {
                Ok(self.reply.clone())
            }
        }
    }

    /// Mock extractive QA model with a fixed answer and score.
    pub struct MockExtractiveQa {
        pub text: String,
        pub score: f32,
    }

    impl ExtractiveQa for MockExtractiveQa {
        fn answer(
            &self,
            _question: &str,
            _context: &str,
        ) -> Result<ExtractiveAnswer, CapabilityError> {
            Ok(ExtractiveAnswer {
                text: self.text.clone(),
                score: self.score,
            })
        }
    }

    /// Mock NER backend serving a fixed entity list.
    pub struct MockNerBackend {
        pub entities: Vec<NamedEntity>,
        pub fail: bool,
        calls: AtomicUsize,
    }

    impl MockNerBackend {
        /// Build a mock whose entities are located by substring search in
        /// the text passed to `entities()`.
        pub fn finding(labeled: &[(&str, &str)]) -> Self {
            Self {
                entities: labeled
                    .iter()
                    .map(|(text, label)| NamedEntity {
                        text: text.to_string(),
                        label: label.to_string(),
                        start: 0,
                        end: 0,
                    })
                    .collect(),
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn entity_calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl NerBackend for MockNerBackend {
        fn entities(&self, text: &str) -> Result<Vec<NamedEntity>, CapabilityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CapabilityError::Backend("NER model crashed".into()));
            }
            // Re-anchor canned entities against the actual input text.
            let mut found = Vec::new();
            for ent in &self.entities {
                if let Some(start) = text.find(&ent.text) {
                    found.push(NamedEntity {
                        text: ent.text.clone(),
                        label: ent.label.clone(),
                        start,
                        end: start + ent.text.len(),
                    });
                }
            }
            Ok(found)
        }
    }

    /// Minimal valid PNG of the given size (white), for mock rendering.
    pub fn blank_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([255u8, 255, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageOutputFormat::Png)
            .expect("encoding a blank PNG cannot fail");
        buf.into_inner()
    }
}
