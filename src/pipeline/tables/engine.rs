//! Per-document table extraction driver.

use std::sync::Arc;

use image::imageops;
use image::RgbImage;

use super::detect::detect_regions;
use super::parse::{parse_table_text, parse_text_block, MIN_REGION_TEXT_LEN};
use super::types::{TableRecord, TableRegion, TableSource};
use crate::capabilities::{OcrBackend, RecognizedWord};
use crate::document::Page;

/// Vertical distance within which word centers count as one line.
const LINE_TOLERANCE_PX: f32 = 10.0;
/// Horizontal gap past which adjacent words are joined with a column
/// break (double space) instead of a single space.
const COLUMN_GAP_PX: f32 = 20.0;

pub struct TableEngine {
    backend: Option<Arc<dyn OcrBackend>>,
}

impl TableEngine {
    pub fn new(backend: Option<Arc<dyn OcrBackend>>) -> Self {
        Self { backend }
    }

    fn backend(&self) -> Option<&dyn OcrBackend> {
        self.backend.as_deref().filter(|b| b.available())
    }

    /// Extract tables from every page. Table ids are 1-based and run
    /// across the whole document.
    pub fn extract(&self, pages: &[Page]) -> Vec<TableRecord> {
        let mut tables = Vec::new();
        for page in pages {
            let page_number = page.index + 1;
            if page.has_sufficient_text() {
                let text = page.text_layer.as_deref().unwrap_or_default();
                if let Some((headers, rows)) = parse_text_block(text) {
                    tables.push(TableRecord {
                        table_id: tables.len() + 1,
                        page_number,
                        headers,
                        rows,
                        accuracy: TableSource::TextLayer.accuracy(),
                        source: TableSource::TextLayer,
                        region: None,
                    });
                }
                continue;
            }
            if let Some(raster) = &page.raster {
                self.extract_from_raster(raster, page_number, &mut tables);
            }
        }
        tracing::info!(tables = tables.len(), "Table extraction complete");
        tables
    }

    fn extract_from_raster(
        &self,
        raster: &RgbImage,
        page_number: usize,
        tables: &mut Vec<TableRecord>,
    ) {
        let Some(backend) = self.backend() else {
            tracing::debug!(page = page_number, "No OCR backend, skipping raster tables");
            return;
        };

        for region in detect_regions(raster) {
            let Some(text) = self.read_region(backend, raster, &region, page_number) else {
                continue;
            };
            if let Some((headers, rows)) = parse_table_text(&text) {
                tables.push(TableRecord {
                    table_id: tables.len() + 1,
                    page_number,
                    headers,
                    rows,
                    accuracy: TableSource::GridOcr.accuracy(),
                    source: TableSource::GridOcr,
                    region: Some(region),
                });
            }
        }
    }

    /// OCR a cropped region once per recognition profile, keeping the
    /// first pass whose reconstructed text is long enough to be readable.
    fn read_region(
        &self,
        backend: &dyn OcrBackend,
        raster: &RgbImage,
        region: &TableRegion,
        page_number: usize,
    ) -> Option<String> {
        let crop =
            imageops::crop_imm(raster, region.x, region.y, region.width, region.height)
                .to_image();

        for profile in backend.profiles() {
            let words = match backend.recognize(&crop, &profile) {
                Ok(words) => words,
                Err(e) => {
                    tracing::warn!(
                        page = page_number,
                        profile = profile.as_str(),
                        error = %e,
                        "Region OCR pass failed, skipping"
                    );
                    continue;
                }
            };
            let text = layout_lines(&words);
            if text.len() > MIN_REGION_TEXT_LEN {
                return Some(text);
            }
        }
        None
    }
}

/// Rebuild line-oriented text from positioned words: cluster by vertical
/// center, order left-to-right, and widen large horizontal gaps into
/// double spaces so the column splitter can see them.
fn layout_lines(words: &[RecognizedWord]) -> String {
    if words.is_empty() {
        return String::new();
    }

    let mut sorted: Vec<&RecognizedWord> = words.iter().collect();
    sorted.sort_by(|a, b| {
        a.quad
            .center_y()
            .partial_cmp(&b.quad.center_y())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut lines: Vec<Vec<&RecognizedWord>> = Vec::new();
    for word in sorted {
        match lines.last_mut() {
            Some(line)
                if (word.quad.center_y() - line[0].quad.center_y()).abs()
                    <= LINE_TOLERANCE_PX =>
            {
                line.push(word)
            }
            _ => lines.push(vec![word]),
        }
    }

    let mut out = String::new();
    for line in &mut lines {
        line.sort_by(|a, b| {
            a.quad
                .left()
                .partial_cmp(&b.quad.left())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if !out.is_empty() {
            out.push('\n');
        }
        let mut prev_right: Option<f32> = None;
        for word in line.iter() {
            if let Some(right) = prev_right {
                if word.quad.left() - right > COLUMN_GAP_PX {
                    out.push_str("  ");
                } else {
                    out.push(' ');
                }
            }
            out.push_str(word.text.trim());
            prev_right = Some(word.quad.right());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::mock::FailingOcrBackend;
    use crate::capabilities::{BoundingQuad, CapabilityError};

    fn word(text: &str, x: f32, y: f32) -> RecognizedWord {
        RecognizedWord {
            text: text.to_string(),
            quad: BoundingQuad::from_rect(x, y, 12.0 * text.len() as f32, 20.0),
            confidence: 0.9,
        }
    }

    /// Backend laying out a 2x3 grid with wide column gaps.
    struct GridBackend;

    impl OcrBackend for GridBackend {
        fn recognize(
            &self,
            _image: &RgbImage,
            _profile: &str,
        ) -> Result<Vec<RecognizedWord>, CapabilityError> {
            Ok(vec![
                word("Item", 10.0, 10.0),
                word("Qty", 150.0, 10.0),
                word("Price", 280.0, 10.0),
                word("Widget", 10.0, 50.0),
                word("2", 150.0, 50.0),
                word("10.00", 280.0, 50.0),
            ])
        }
    }

    fn raster_page(index: usize) -> Page {
        Page {
            index,
            text_layer: None,
            raster: Some(RgbImage::from_pixel(64, 64, image::Rgb([255, 255, 255]))),
        }
    }

    // --- layout reconstruction ---

    #[test]
    fn layout_groups_lines_and_marks_columns() {
        let words = vec![
            word("Item", 10.0, 10.0),
            word("Qty", 200.0, 12.0),
            word("Widget", 10.0, 50.0),
            word("2", 200.0, 48.0),
        ];
        let text = layout_lines(&words);
        assert_eq!(text, "Item  Qty\nWidget  2");
    }

    #[test]
    fn close_words_join_with_single_space() {
        let words = vec![word("Unit", 10.0, 10.0), word("Price", 62.0, 10.0)];
        // 12*4=48 wide, right edge 58, gap 4 -> same cell.
        assert_eq!(layout_lines(&words), "Unit Price");
    }

    // --- engine ---

    #[test]
    fn text_layer_page_parses_directly() {
        let page = Page {
            index: 0,
            text_layer: Some(
                "Item  Qty  Price\nWidget  2  10.00\nGadget  1  25.50".to_string(),
            ),
            raster: None,
        };
        let engine = TableEngine::new(None);
        let tables = engine.extract(&[page]);

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].source, TableSource::TextLayer);
        assert!((tables[0].accuracy - 0.85).abs() < f32::EPSILON);
        assert_eq!(tables[0].headers, vec!["Item", "Qty", "Price"]);
        assert_eq!(tables[0].row_count(), 2);
        assert!(tables[0].region.is_none());
    }

    #[test]
    fn raster_page_uses_grid_ocr() {
        let engine = TableEngine::new(Some(Arc::new(GridBackend)));
        let tables = engine.extract(&[raster_page(0)]);

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].source, TableSource::GridOcr);
        assert!((tables[0].accuracy - 0.70).abs() < f32::EPSILON);
        assert_eq!(tables[0].headers, vec!["Item", "Qty", "Price"]);
        assert_eq!(tables[0].rows[0], vec!["Widget", "2", "10.00"]);
        assert!(tables[0].region.is_some());
    }

    #[test]
    fn raster_page_without_backend_yields_nothing() {
        let engine = TableEngine::new(None);
        assert!(engine.extract(&[raster_page(0)]).is_empty());
    }

    #[test]
    fn failing_backend_yields_nothing() {
        let engine = TableEngine::new(Some(Arc::new(FailingOcrBackend)));
        assert!(engine.extract(&[raster_page(0)]).is_empty());
    }

    #[test]
    fn table_ids_run_across_pages() {
        let table_text = "Item  Qty\nWidget  2";
        let pages = vec![
            Page {
                index: 0,
                text_layer: Some(format!("{table_text}\nExtra  1")),
                raster: None,
            },
            Page {
                index: 1,
                text_layer: Some(table_text.to_string()),
                raster: None,
            },
        ];
        let engine = TableEngine::new(None);
        let tables = engine.extract(&pages);

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].table_id, 1);
        assert_eq!(tables[1].table_id, 2);
        assert_eq!(tables[1].page_number, 2);
    }
}
