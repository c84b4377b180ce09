use thiserror::Error;

/// Failure surfaced by a rendering engine.
///
/// `Config` is returned from engine construction; `Runtime` values arrive over
/// the engine's error channel while it is watching backends.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid runner config: {0}")]
    Config(String),

    #[error("{0}")]
    Runtime(String),
}
