//! Error types for psmark annotation injection.

use thiserror::Error;

/// Primary error type for annotation injection.
#[derive(Error, Debug)]
pub enum PsMarkError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed annotation data: {0}")]
    AnnotationDecode(String),

    #[error("degenerate media box [{x0} {y0} {x1} {y1}]")]
    DegenerateMediaBox { x0: f64, y0: f64, x1: f64, y1: f64 },

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl From<serde_json::Error> for PsMarkError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            return PsMarkError::Io(err.into());
        }
        PsMarkError::AnnotationDecode(err.to_string())
    }
}

/// Convenience Result type alias for PsMarkError.
pub type Result<T> = std::result::Result<T, PsMarkError>;
