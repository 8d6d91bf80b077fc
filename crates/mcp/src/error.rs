//! MCP error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("request too large: {size} bytes (max {max})")]
    RequestTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
