use thiserror::Error;

/// Errors produced by the pairchat protocol layer.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("codec error: {0}")]
    Codec(String),

    #[error("incomplete session: {0} is empty")]
    IncompleteSession(&'static str),

    #[error("invalid server url: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Codec(e.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
