//! Crate-level error type and `Result` alias for stable, structured error
//! handling. Converts underlying I/O, GDAL, and warp errors, and provides
//! semantic variants for shape and processing failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] crate::io::GdalError),

    #[error("Warp error: {0}")]
    Warp(#[from] crate::io::WarpError),

    #[error("Shape mismatch: expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    ShapeMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Processing error: {0}")]
    Processing(String),
}
