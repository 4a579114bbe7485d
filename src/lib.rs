pub mod capabilities;
pub mod config;
pub mod document;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

pub use document::{DocumentInput, NormalizeError, Page};
pub use pipeline::processor::{DocumentAnalysis, DocumentPipeline, PipelineCapabilities};
pub use pipeline::PipelineError;

/// Initialize tracing with an env-filter (`RUST_LOG` or a sensible default).
///
/// Call once from the host process before serving traffic. Library code only
/// emits `tracing` events and never installs a subscriber on its own.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docsift=info")),
        )
        .init();
}
