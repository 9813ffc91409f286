use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No {entity} with ID {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, SiftError>;

/// Why a raw row could not become a transaction. Recovered by the normalizer,
/// never returned from a batch operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("missing required column: {0}")]
    MissingField(&'static str),

    #[error("amount is not a number: {0:?}")]
    InvalidAmount(String),

    #[error("unreadable record: {0}")]
    Unreadable(String),
}
