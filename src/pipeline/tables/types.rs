use serde::{Deserialize, Serialize};

/// Axis-aligned region on a raster page, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TableRegion {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// How a table's cells were obtained. Each source carries a fixed
/// heuristic accuracy used for display and filtering downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    /// Detected grid region on a raster page, cells read back via OCR.
    GridOcr,
    /// Parsed straight out of a native text layer.
    TextLayer,
}

impl TableSource {
    pub fn accuracy(&self) -> f32 {
        match self {
            TableSource::GridOcr => 0.70,
            TableSource::TextLayer => 0.85,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableSource::GridOcr => "grid_ocr",
            TableSource::TextLayer => "text_layer",
        }
    }
}

/// One extracted table: header row, data rows normalized to the header
/// width, and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecord {
    pub table_id: usize,
    pub page_number: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub accuracy: f32,
    pub source: TableSource,
    pub region: Option<TableRegion>,
}

impl TableRecord {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
