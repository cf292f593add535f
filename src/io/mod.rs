//! File formats around the engine: motor tables in, traces and summaries out.

pub mod csv;
pub mod json;

use crate::error::SimError;

/// Failures reading or writing data files.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A row that cannot be turned into numbers. `line` is 1-based.
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Sim(#[from] SimError),
}
