use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

/// Category of a task event surfaced to operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub enum TaskEventKind {
    /// The task is being killed.
    Killing,
    /// The task is being signalled.
    Signaling,
    /// The task is being restarted because a template re-rendered.
    RestartSignal,
    /// A hook (template script) failed.
    HookFailed,
    /// Informational message from a hook.
    HookMessage,
    /// Generic template telemetry (e.g. missing dependencies).
    Template,
}

/// One user-visible event in a task's history.
///
/// Built fluently: `TaskEvent::new(kind).with_display_message(..)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct TaskEvent {
    pub kind: TaskEventKind,
    /// Human-readable message shown in task status output.
    #[serde(default)]
    pub display_message: String,
    /// Whether this event marks the task as failed.
    #[serde(default)]
    pub fails_task: bool,
    /// Signal name attached to signalling events.
    #[serde(default)]
    pub task_signal: Option<String>,
}

impl TaskEvent {
    pub fn new(kind: TaskEventKind) -> Self {
        Self {
            kind,
            display_message: String::new(),
            fails_task: false,
            task_signal: None,
        }
    }

    pub fn with_display_message(mut self, msg: impl Into<String>) -> Self {
        self.display_message = msg.into();
        self
    }

    pub fn with_fails_task(mut self) -> Self {
        self.fails_task = true;
        self
    }

    pub fn with_task_signal(mut self, signal: impl Into<String>) -> Self {
        self.task_signal = Some(signal.into());
        self
    }
}
