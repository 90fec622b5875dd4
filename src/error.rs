use thiserror::Error;

/// Errors produced at the ingestion / normalization boundary.
///
/// These are terminal for the session: the caller reports the message and
/// leaves the dashboard with no data. Downstream stages (filter, aggregate)
/// only ever see a valid table and never re-validate it.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("No usable data: {0}")]
    DataUnavailable(String),

    #[error("Malformed source: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
