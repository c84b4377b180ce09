mod runner;
mod translate;

pub(crate) use runner::build_runner_config;
pub(crate) use translate::translate_specs;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ttm_engine::RunnerFactory;
use ttm_model::{ClientTemplateConfig, ConsulConfig, TemplateSpec, VaultConfig};

use crate::env::EnvBuilder;
use crate::error::TemplateError;
use crate::latch::StartLatch;
use crate::lifecycle::{EventSink, TaskLifecycle};

/// Default minimum spacing between missing-dependency telemetry events.
pub const DEFAULT_MAX_TEMPLATE_EVENT_RATE: Duration = Duration::from_secs(3);

/// Everything needed to construct a [`crate::TaskTemplateManager`] for one task.
#[derive(Clone)]
pub struct ManagerConfig {
    /// Released when every template has reached a first render decision.
    pub unblock: StartLatch,
    /// Capability set on the supervised task.
    pub lifecycle: Arc<dyn TaskLifecycle>,
    /// Sink for user-visible task events.
    pub events: Arc<dyn EventSink>,
    /// Builder for the task environment observed by templates.
    pub env_builder: Arc<dyn EnvBuilder>,
    /// Constructs the rendering engine from the assembled configuration.
    pub runner_factory: Arc<dyn RunnerFactory>,
    /// The set of templates to manage.
    pub templates: Vec<TemplateSpec>,
    /// Client-wide template settings.
    pub client: ClientTemplateConfig,
    /// Agent configuration-store settings, if the node has any.
    pub consul: Option<ConsulConfig>,
    /// Workload-identity token for the configuration store; may be empty.
    pub consul_token: String,
    /// Task-level configuration-store namespace; overrides the agent's.
    pub consul_namespace: String,
    /// Agent secret-store settings, if the node has any.
    pub vault: Option<VaultConfig>,
    /// Secret-store token for the task.
    pub vault_token: String,
    /// Task-level secret-store namespace; overrides the agent's.
    pub vault_namespace: String,
    /// Cluster namespace of the task.
    pub nomad_namespace: String,
    /// Cluster token or identity claim for the task.
    pub nomad_token: String,
    /// The task's directory; the sandbox root for all template I/O.
    pub task_dir: PathBuf,
    /// Unique identifier of this task, used in logs and I/O hooks.
    pub task_id: String,
    /// Minimum spacing between missing-dependency telemetry events.
    pub max_template_event_rate: Duration,
}

impl ManagerConfig {
    /// Validate the configuration before any engine work happens.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.task_dir.as_os_str().is_empty() {
            return Err(TemplateError::Config("no task directory given".into()));
        }
        if self.max_template_event_rate.is_zero() {
            return Err(TemplateError::Config(
                "max template event rate must be positive".into(),
            ));
        }

        // Once is an engine-wide setting, so every template must agree on it.
        if let Some(first) = self.templates.first() {
            if self.templates.iter().any(|t| t.once != first.once) {
                return Err(TemplateError::Config(
                    "all templates must share the same once value".into(),
                ));
            }
        }

        Ok(())
    }

    /// Whether the engine should evaluate templates a single time.
    pub fn once_mode_enabled(&self) -> bool {
        self.templates.first().is_some_and(|t| t.once)
    }
}
