//! Error types for the Vahana model zoo

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZooError {
    #[error("model not found: no {engine} catalog entry matches criteria {criteria}")]
    ModelNotFound { engine: String, criteria: String },

    #[error("ambiguous criteria: {criteria} matches {count} {engine} models ({candidates})")]
    AmbiguousCriteria {
        engine: String,
        criteria: String,
        count: usize,
        candidates: String,
    },

    #[error("unknown criteria attribute: {attribute} (known: {known})")]
    UnknownAttribute { attribute: String, known: String },

    #[error("model load error: {0}")]
    ModelLoad(String),

    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("session closed")]
    SessionClosed,

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl ZooError {
    /// IO failure with a free-form cause, for paths that do not start
    /// from a `std::io::Error`.
    pub fn io_other(message: impl Into<String>) -> Self {
        ZooError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            message.into(),
        ))
    }
}

pub type Result<T> = std::result::Result<T, ZooError>;
