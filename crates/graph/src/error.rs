use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Unknown module match mode: {0} (expected \"prefix\" or \"segment\")")]
    InvalidMatchMode(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),
}
