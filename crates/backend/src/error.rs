use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackendError>;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("API key is missing")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend reply had no text content")]
    EmptyReply,

    #[error("could not decode backend reply: {0}")]
    Decode(String),

    #[error("unknown provider: {0} (expected openai or anthropic)")]
    UnknownProvider(String),
}
