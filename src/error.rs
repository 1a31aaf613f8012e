//! Error taxonomy shared by the completion client and the stage pipeline.

use crate::pipeline::Stage;
use std::time::Duration;

/// Failure of a single call to the completion provider.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("completion returned no text")]
    EmptyResponse,

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),
}

/// Model output did not decode into the expected JSON shape.
#[derive(Debug, thiserror::Error)]
#[error("response is not the expected JSON shape: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Outcome of a failed pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(&'static str),

    #[error("{stage} stage failed: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: UpstreamError,
    },

    #[error("{stage} stage returned unparseable output: {source}")]
    Parse {
        stage: Stage,
        #[source]
        source: DecodeError,
    },
}

impl PipelineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
