//! Error taxonomy shared by the deck pipeline.

use thiserror::Error;

/// Failures reported by a [`TrackSource`](crate::source::TrackSource).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("authentication rejected by the catalog service: {0}")]
    Auth(String),
    #[error("playlist not found: {0}")]
    NotFound(String),
    #[error("rate limited by the catalog service (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response from the catalog service: {0}")]
    Decode(String),
}

/// Top-level error for configuration, fetching, encoding and layout.
#[derive(Debug, Error)]
pub enum DeckError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("cannot encode {payload:?} as a scannable code: {reason}")]
    Encoding { payload: String, reason: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("track file error: {0}")]
    TrackFile(String),
    #[error("failed to write PDF: {0}")]
    Pdf(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DeckError {
    pub(crate) fn layout<S: Into<String>>(msg: S) -> Self {
        DeckError::Layout(msg.into())
    }

    pub(crate) fn encoding<P: Into<String>, R: ToString>(payload: P, reason: R) -> Self {
        DeckError::Encoding {
            payload: payload.into(),
            reason: reason.to_string(),
        }
    }
}
