//! Error types for ingestion and output.
//!
//! Library-style failures use `thiserror`; `main.rs` propagates them with
//! `anyhow` and adds context.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading an uploaded accident file
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("expected a .csv file, got {}", .0.display())]
    NotCsv(PathBuf),

    #[error("failed to read accident data: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("no usable rows in {0}")]
    Empty(String),
}

/// Errors raised while writing generated data or rendered views
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("failed to write CSV: {0}")]
    CsvFailed(#[from] csv::Error),

    #[error("invalid output path: {0}")]
    InvalidPath(String),
}
