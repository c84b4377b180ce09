//! Shared fakes for unit tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ttm_engine::{EngineError, RunnerConfig, RunnerFactory, RunnerHandle};
use ttm_model::{ClientTemplateConfig, TaskEvent, TemplateSpec};

use crate::config::{DEFAULT_MAX_TEMPLATE_EVENT_RATE, ManagerConfig};
use crate::env::{EnvBuilder, TaskEnv};
use crate::latch::StartLatch;
use crate::lifecycle::{EventSink, ExecResult, LifecycleError, TaskLifecycle};

/// Lifecycle stub that accepts every call and reports the task as stopped.
pub(crate) struct NullLifecycle;

#[async_trait]
impl TaskLifecycle for NullLifecycle {
    async fn kill(&self, _event: TaskEvent) {}

    async fn signal(&self, _event: TaskEvent, _signal: &str) -> Result<(), LifecycleError> {
        Ok(())
    }

    async fn restart(&self, _event: TaskEvent, _fail: bool) {}

    async fn exec(
        &self,
        _timeout: Duration,
        _command: &str,
        _args: &[String],
    ) -> Result<ExecResult, LifecycleError> {
        Ok(ExecResult::default())
    }

    fn is_running(&self) -> bool {
        false
    }
}

/// Event sink that discards everything.
pub(crate) struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: TaskEvent) {}
}

/// Env builder returning a fixed environment.
pub(crate) struct FixedEnv(pub(crate) TaskEnv);

impl EnvBuilder for FixedEnv {
    fn build(&self) -> TaskEnv {
        self.0.clone()
    }

    fn set_template_env(&self, _env: HashMap<String, String>) {}
}

/// Factory for tests that never reach engine construction.
pub(crate) struct NoFactory;

impl RunnerFactory for NoFactory {
    fn create(&self, _config: RunnerConfig) -> Result<RunnerHandle, EngineError> {
        Err(EngineError::Config("engine not expected in this test".into()))
    }
}

/// A manager config over `/alloc/web` with null collaborators.
pub(crate) fn manager_config(templates: Vec<TemplateSpec>) -> ManagerConfig {
    ManagerConfig {
        unblock: StartLatch::new(),
        lifecycle: Arc::new(NullLifecycle),
        events: Arc::new(NullSink),
        env_builder: Arc::new(FixedEnv(TaskEnv::new("/alloc/web", HashMap::new()))),
        runner_factory: Arc::new(NoFactory),
        templates,
        client: ClientTemplateConfig::default(),
        consul: None,
        consul_token: String::new(),
        consul_namespace: String::new(),
        vault: None,
        vault_token: String::new(),
        vault_namespace: String::new(),
        nomad_namespace: "default".to_string(),
        nomad_token: String::new(),
        task_dir: PathBuf::from("/alloc/web"),
        task_id: "web".to_string(),
        max_template_event_rate: DEFAULT_MAX_TEMPLATE_EVENT_RATE,
    }
}
