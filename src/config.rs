use std::path::PathBuf;

/// Crate version, surfaced in logs by the host.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed upscaling factor applied when rasterizing a PDF page for OCR.
pub const RASTER_SCALE: f32 = 2.0;

/// A page whose native text layer has more than this many words is accepted
/// directly and never rasterized (text-layer short-circuit).
pub const TEXT_LAYER_MIN_WORDS: usize = 3;

/// Confidence assigned to text-layer pages. Native text is reliable.
pub const TEXT_LAYER_CONFIDENCE: f32 = 0.95;

/// Per-token confidence floor for raster OCR output. Tokens below this are
/// discarded before variant selection.
pub const TOKEN_CONFIDENCE_FLOOR: f32 = 0.3;

/// Get the application data directory (`~/.docsift/` on all platforms).
pub fn data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(".docsift")
}

/// Get the models directory (fitted classifier artifacts, etc.)
pub fn models_dir() -> PathBuf {
    data_dir().join("models")
}

/// Default path of the persisted document-type classifier artifact.
pub fn classifier_artifact_path() -> PathBuf {
    models_dir().join("doc_type_classifier.json")
}
