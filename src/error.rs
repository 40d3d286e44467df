//! Error types for Parley.

use thiserror::Error;

use crate::command::{ParseError, TokenizeError};
use crate::session::SendError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Tokenize error: {0}")]
    Tokenize(#[from] TokenizeError),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("Telegram error: {0}")]
    Telegram(String),

    #[error("{0}")]
    Other(String),
}
