use thiserror::Error;

/// Reasons a single listing page cannot be turned into records.
///
/// Every variant aborts the page it was raised for; the pipeline attaches the
/// page identity when it propagates the error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("failed to detect column name for \"{label}\"")]
    UnknownLabel { label: String },
    #[error("identifier label \"{label}\" carries no numeric token")]
    MissingIdentifier { label: String },
    #[error("row {row} (\"{label}\") appears before any identifier row")]
    RowBeforeIdentifier { row: usize, label: String },
    #[error("listing table has no rows")]
    NoRows,
    #[error("listing row {row} has no cells")]
    EmptyRow { row: usize },
}
