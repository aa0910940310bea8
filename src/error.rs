use thiserror::Error;

/// Errors produced while talking to the bot or loading settings.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("chat service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chat service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("responder failed: {0}")]
    Responder(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
