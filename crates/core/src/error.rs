use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpandocError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, SpandocError>;
