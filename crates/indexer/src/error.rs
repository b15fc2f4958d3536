use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid corpus root: {0}")]
    InvalidPath(String),

    #[error("Refusing to write outside the output directory: {0}")]
    UnsafeOutputPath(String),
}
