mod config;
mod error;
mod event;
mod spec;

pub use config::{
    ClientTemplateConfig, ConsulConfig, RetryConfig, TransportConfig, VaultConfig,
    default_function_denylist,
};
pub use error::{ModelError, ModelResult};
pub use event::{TaskEvent, TaskEventKind};
pub use spec::{ChangeMode, ChangeScript, TemplateSpec, WaitConfig};

#[cfg(feature = "schema")]
pub use schemars::{JsonSchema, schema_for};

pub mod prelude {
    pub use crate::{
        ChangeMode, ChangeScript, ClientTemplateConfig, ConsulConfig, RetryConfig, TaskEvent,
        TaskEventKind, TemplateSpec, VaultConfig, WaitConfig,
    };
    #[cfg(feature = "schema")]
    pub use schemars::{JsonSchema, schema_for};
}
