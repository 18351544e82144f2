use std::path::PathBuf;

use thiserror::Error;

use crate::shared::detection::Detection;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field `{field}` in {context}")]
    MissingField { field: &'static str, context: String },
    #[error("identifier must be a string or a non-negative integer in {context}")]
    InvalidIdentifier { context: String },
}

/// Domain interface for anything that can supply detection records.
///
/// Sources surface malformed records as errors; they never coerce a missing
/// identifier, frame or box into a default value.
pub trait DetectionSource: Send {
    fn load(&mut self) -> Result<Vec<Detection>, IngestError>;
}
