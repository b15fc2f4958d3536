use thiserror::Error;

/// Why one parse strategy rejected a reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    #[error("no ```json fenced block found")]
    NoFencedBlock,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("JSON is not an object of file paths")]
    NotAnObject,

    #[error("value for {0} is not a string")]
    NonStringValue(String),

    #[error("no '--- File: <path> ---' sections found")]
    NoFileSections,
}
