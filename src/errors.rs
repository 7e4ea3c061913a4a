use std::io;

use thiserror::Error;

/// Errors raised while opening a map file, rendering a tile or touching the
/// disk tile cache.
#[derive(Debug, Error)]
pub enum MapRenderError {
    #[error("not a map file: {0}")]
    NotAMapFile(String),

    #[error("unsupported file version: {0}")]
    UnsupportedVersion(i32),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O failure: {0}")]
    IoFailure(#[from] io::Error),

    #[error("corrupt cached bitmap: {0}")]
    CacheCorruption(String),
}

impl MapRenderError {
    pub fn malformed(message: impl Into<String>) -> Self {
        MapRenderError::MalformedInput(message.into())
    }
}

impl From<std::string::FromUtf8Error> for MapRenderError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        MapRenderError::MalformedInput(format!("invalid UTF-8: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, MapRenderError>;
