use serde::{Deserialize, Serialize};

/// Broad file categories the pipeline handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Pdf,
    Image,
    PlainText,
    Unsupported,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::PlainText => "plain_text",
            Self::Unsupported => "unsupported",
        }
    }

}

/// Result of format detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDetection {
    pub mime_type: String,
    pub category: FileCategory,
    pub size_bytes: usize,
}

const MAX_DOCUMENT_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Detect document format from magic bytes, never the file name.
pub fn detect_format(bytes: &[u8]) -> FormatDetection {
    let size_bytes = bytes.len();

    if size_bytes == 0 || size_bytes > MAX_DOCUMENT_BYTES {
        return FormatDetection {
            mime_type: "unknown".into(),
            category: FileCategory::Unsupported,
            size_bytes,
        };
    }

    let header = &bytes[..size_bytes.min(12)];
    let (mime_type, category) = match header {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => ("application/pdf", FileCategory::Pdf),
        // JPEG: starts with FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => ("image/jpeg", FileCategory::Image),
        // PNG: starts with 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => ("image/png", FileCategory::Image),
        // TIFF: little-endian (49 49 2A 00) or big-endian (4D 4D 00 2A)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => {
            ("image/tiff", FileCategory::Image)
        }
        _ => {
            if is_likely_text(bytes) {
                ("text/plain", FileCategory::PlainText)
            } else {
                ("application/octet-stream", FileCategory::Unsupported)
            }
        }
    };

    FormatDetection {
        mime_type: mime_type.to_string(),
        category,
        size_bytes,
    }
}

/// Check if bytes are likely plain text (valid UTF-8, mostly printable).
fn is_likely_text(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(4096)];
    let text = match std::str::from_utf8(sample) {
        Ok(t) => t,
        Err(_) => return false,
    };

    let printable = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .count();
    let chars = text.chars().count().max(1);
    printable as f64 / chars as f64 > 0.80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_jpeg_from_magic_bytes() {
        let format = detect_format(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00]);
        assert_eq!(format.category, FileCategory::Image);
        assert_eq!(format.mime_type, "image/jpeg");
    }

    #[test]
    fn detect_png_from_magic_bytes() {
        let format = detect_format(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(format.category, FileCategory::Image);
        assert_eq!(format.mime_type, "image/png");
    }

    #[test]
    fn detect_tiff_both_endians() {
        assert_eq!(
            detect_format(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00]).category,
            FileCategory::Image
        );
        assert_eq!(
            detect_format(&[0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x08]).category,
            FileCategory::Image
        );
    }

    #[test]
    fn detect_pdf() {
        let format = detect_format(b"%PDF-1.4 some content BT /F1 12 Tf (Hello) Tj ET");
        assert_eq!(format.category, FileCategory::Pdf);
        assert_eq!(format.mime_type, "application/pdf");
    }

    #[test]
    fn detect_text() {
        let format = detect_format(b"Invoice Number: INV-001\nTotal: $450.00\n");
        assert_eq!(format.category, FileCategory::PlainText);
    }

    #[test]
    fn detect_binary_as_unsupported() {
        let format = detect_format(&[0x4D, 0x5A, 0x90, 0x00, 0x03, 0x00, 0xFF, 0xFE]);
        assert_eq!(format.category, FileCategory::Unsupported);
        assert_eq!(format.mime_type, "application/octet-stream");
    }

    #[test]
    fn empty_input_unsupported() {
        assert_eq!(detect_format(&[]).category, FileCategory::Unsupported);
    }

    #[test]
    fn wrong_extension_is_irrelevant() {
        // JPEG content is JPEG no matter what the caller named the file.
        let format = detect_format(&[0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(format.category, FileCategory::Image);
    }
}
