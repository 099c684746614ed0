use thiserror::Error;

/// Errors returned by gesture operations.
#[derive(Debug, Error)]
pub enum GestureError {
    #[error("gesture: invalid landmark count: expected {expected}, got {got}")]
    InvalidLandmarkCount { expected: usize, got: usize },

    #[error("gesture: dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("gesture: model error: {0}")]
    Model(String),
}
