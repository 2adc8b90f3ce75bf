//! Error types.

use thiserror::Error;

/// Errors raised while loading configuration, building requests or parsing
/// completion chunks.
///
/// The classifier itself never fails: malformed model output falls back to
/// an empty answer channel instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid markers: {0}")]
    InvalidMarkers(String),

    #[error("Malformed completion chunk: {0}")]
    MalformedChunk(String),

    #[error("Tokenizer unavailable: {0}")]
    Tokenizer(String),
}

pub type Result<T> = std::result::Result<T, Error>;
