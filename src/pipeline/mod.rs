pub mod classify;
pub mod extraction;
pub mod keyvalue;
pub mod processor;
pub mod qa;
pub mod redact;
pub mod tables;

use thiserror::Error;

use crate::document::NormalizeError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}
