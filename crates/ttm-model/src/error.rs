use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid wait bounds: {0}")]
    InvalidWait(String),

    #[error("invalid retry config: {0}")]
    InvalidRetry(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
