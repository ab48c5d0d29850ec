use thiserror::Error;

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("status endpoint returned HTTP {0}")]
    Status(u16),
    #[error("malformed status payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("status payload has no Data object")]
    MissingData,
    #[error("poll interval must be greater than zero")]
    InvalidInterval,
}
