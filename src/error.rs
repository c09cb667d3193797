use thiserror::Error;

/// Errors produced while loading, analysing or exporting a review dataset.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("entry is missing required field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` has invalid value {value:?}")]
    InvalidField { field: String, value: String },

    #[error("product {0} has no co-purchase data")]
    UnknownProduct(String),

    #[error("dataset contains no review entries")]
    EmptyDataset,
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
