// common/src/error.rs
use thiserror::Error;

/// Errors raised while building or decoding guesses
#[derive(Debug, Error)]
pub enum HubError {
    #[error("cannot generate session identity: {0}")]
    Entropy(#[from] rand::Error),

    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("non-finite coordinate (lat={lat}, lng={lng})")]
    NonFiniteCoordinate { lat: f64, lng: f64 },
}
