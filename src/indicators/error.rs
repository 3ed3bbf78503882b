use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("invalid numeric format: {0}")]
    InvalidNumericFormat(String),
    #[error("bar {index} has a non-finite or negative field")]
    MalformedBar { index: usize },
    #[error("bar {index} does not advance the timestamp")]
    NonMonotonicTimestamp { index: usize },
}
