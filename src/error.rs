// src/error.rs

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("unknown field type: '{0}'")]
    UnknownFieldType(String),

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: String, found: String },

    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("movie encoding failed: {0}")]
    Movie(String),
}

impl SimError {
    /// Shape mismatch between two `n × m` lattices.
    pub fn shape_mismatch(expected: (usize, usize), found: (usize, usize)) -> Self {
        Self::DimensionMismatch {
            expected: format!("{}x{}", expected.0, expected.1),
            found: format!("{}x{}", found.0, found.1),
        }
    }

    /// Length mismatch between a per-site array and the lattice.
    pub fn len_mismatch(expected: usize, found: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{expected} sites"),
            found: format!("{found} sites"),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
