use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for workbook export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Error type returned by loading, normalization and export.
///
/// Open/load failures are fatal for a run; header promotion and export failures only fail the
/// sheet they happened on.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Underlying I/O error (e.g. file not found, permission denied, rename failed).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook could not be opened or a sheet could not be read.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Serializing rows to JSON failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The path does not have a recognized workbook extension.
    #[error("unsupported workbook format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Header promotion was required but row 0 cannot serve as a header.
    #[error("sheet '{sheet}': cannot promote header row: {message}")]
    HeaderPromotion { sheet: String, message: String },
}
