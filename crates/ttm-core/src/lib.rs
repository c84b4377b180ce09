//! Per-task template supervisor.
//!
//! Responsibilities:
//! - translate declared template specs into a rendering-engine configuration
//!   confined to the task sandbox;
//! - hold task startup until every template has reached a first render
//!   decision, surfacing missing dependencies as throttled events;
//! - in steady state, coalesce re-render events into change actions
//!   (signal / restart / script) and apply them through the task lifecycle;
//! - harvest `KEY=VALUE` destination files into the task environment.

mod config;
mod dispatch;
mod env;
mod error;
mod gate;
mod latch;
mod lifecycle;
mod manager;
mod sandbox;
mod script;
mod signals;
#[cfg(test)]
mod testutil;

pub use config::{DEFAULT_MAX_TEMPLATE_EVENT_RATE, ManagerConfig};
pub use env::{EnvBuilder, HarvestError, ResolvedPath, TaskEnv, load_template_env};
pub use error::TemplateError;
pub use latch::StartLatch;
pub use lifecycle::{EventSink, ExecResult, LifecycleError, TaskLifecycle};
pub use manager::TaskTemplateManager;
pub use signals::SignalTable;

pub mod prelude {
    pub use crate::{
        EnvBuilder, EventSink, ManagerConfig, StartLatch, TaskEnv, TaskLifecycle,
        TaskTemplateManager, TemplateError,
    };
}
