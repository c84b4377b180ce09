use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use ttm_model::TaskEvent;

/// Failure reported by a lifecycle collaborator call.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct LifecycleError(pub String);

/// Output of one script execution inside the task.
#[derive(Clone, Debug, Default)]
pub struct ExecResult {
    pub output: Vec<u8>,
    pub exit_code: i32,
}

/// Capability set the manager holds on the task it supervises.
///
/// The manager keeps only this outward reference; implementations must not
/// hold a strong reference back to the manager.
#[async_trait]
pub trait TaskLifecycle: Send + Sync {
    /// Kill the task. Delivery problems are the collaborator's to handle.
    async fn kill(&self, event: TaskEvent);

    /// Deliver the named signal to the task.
    async fn signal(&self, event: TaskEvent, signal: &str) -> Result<(), LifecycleError>;

    /// Restart the task. `fail` marks the restart as a task failure.
    async fn restart(&self, event: TaskEvent, fail: bool);

    /// Execute a command inside the task, bounded by `timeout`.
    async fn exec(
        &self,
        timeout: Duration,
        command: &str,
        args: &[String],
    ) -> Result<ExecResult, LifecycleError>;

    /// Whether the task's main process is currently running.
    fn is_running(&self) -> bool;
}

/// Outbound telemetry sink for user-visible task events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: TaskEvent);
}
