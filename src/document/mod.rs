pub mod format;
pub mod normalize;

pub use format::{detect_format, FileCategory, FormatDetection};
pub use normalize::{normalize, DocumentInput, Page};

use thiserror::Error;

use crate::capabilities::CapabilityError;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("document is empty")]
    EmptyDocument,

    #[error("no PDF renderer capability configured")]
    PdfBackendUnavailable,

    #[error("image decoding failed: {0}")]
    ImageDecode(String),

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}
