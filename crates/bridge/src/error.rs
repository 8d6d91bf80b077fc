use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),
}

pub type Result<T> = std::result::Result<T, Error>;
