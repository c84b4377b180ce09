use thiserror::Error;

use ttm_engine::EngineError;
use ttm_model::ModelError;

/// Construction-time failure of the template manager.
///
/// Runtime failures never appear here: once the manager is running, errors
/// are translated into lifecycle kill events so the surrounding task runner
/// observes a single failure channel.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("invalid template manager config: {0}")]
    Config(String),

    #[error("failed to parse signal {0:?}")]
    BadSignal(String),

    #[error("template source path escapes the task directory")]
    SourceEscapes,

    #[error("template destination path escapes the task directory")]
    DestinationEscapes,

    #[error("failed to parse {0:?} as octal permissions")]
    BadPermissions(String),

    #[error("failed to parse auth {0:?} as user:pass")]
    BadAuth(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}
