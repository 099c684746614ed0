use thiserror::Error;

/// Errors returned by translator operations.
#[derive(Debug, Error)]
pub enum TranslatorError {
    #[error("translator: store error: {0}")]
    Store(String),

    #[error("translator: speech error: {0}")]
    Speech(String),

    #[error("translator: io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translator: serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
