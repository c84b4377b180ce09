//! Fakes shared by the manager integration tests: a scriptable rendering
//! engine and recording lifecycle/event/env collaborators.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use ttm_core::{
    EnvBuilder, EventSink, ExecResult, LifecycleError, ManagerConfig, StartLatch, TaskEnv,
    TaskLifecycle, TaskTemplateManager,
};
use ttm_engine::{
    EngineError, RenderEvent, RunnerChannels, RunnerConfig, RunnerFactory, RunnerHandle,
    TemplateConfig, TemplateId, TemplateRunner,
};
use ttm_model::{ClientTemplateConfig, TaskEvent, TemplateSpec};

/// Rendering engine whose state is set directly by the test.
pub struct MockRunner {
    events: Mutex<HashMap<TemplateId, RenderEvent>>,
    mapping: HashMap<TemplateId, Vec<TemplateConfig>>,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
}

impl MockRunner {
    fn new(mapping: HashMap<TemplateId, Vec<TemplateConfig>>) -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
            mapping,
            started: AtomicUsize::new(0),
            stopped: AtomicUsize::new(0),
        }
    }

    pub fn set_event(&self, id: &str, event: RenderEvent) {
        self.events.lock().unwrap().insert(id.to_string(), event);
    }
}

impl TemplateRunner for MockRunner {
    fn start(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.stopped.fetch_add(1, Ordering::SeqCst);
    }

    fn render_events(&self) -> HashMap<TemplateId, RenderEvent> {
        self.events.lock().unwrap().clone()
    }

    fn template_mapping(&self) -> HashMap<TemplateId, Vec<TemplateConfig>> {
        self.mapping.clone()
    }
}

/// Sender half of the engine channel bundle plus the mock runner.
pub struct EngineHarness {
    pub runner: Arc<MockRunner>,
    pub errors_tx: mpsc::Sender<EngineError>,
    pub rendered_tx: mpsc::Sender<()>,
    pub events_tx: mpsc::Sender<()>,
    pub done_tx: mpsc::Sender<()>,
}

impl EngineHarness {
    /// All template identities known to the engine.
    pub fn ids(&self) -> Vec<TemplateId> {
        self.runner.mapping.keys().cloned().collect()
    }

    /// The identity whose destination ends with `suffix`.
    pub fn id_for_dest(&self, suffix: &str) -> TemplateId {
        self.runner
            .mapping
            .iter()
            .find(|(_, descriptors)| {
                descriptors.iter().any(|d| {
                    d.destination
                        .as_deref()
                        .is_some_and(|p| p.to_string_lossy().ends_with(suffix))
                })
            })
            .map(|(id, _)| id.clone())
            .unwrap_or_else(|| panic!("no template with destination suffix {suffix:?}"))
    }

    /// Mark every template as decided at `when` without a disk write, then
    /// wake the manager.
    pub async fn render_all_clean(&self, when: std::time::SystemTime) {
        for id in self.ids() {
            self.runner.set_event(
                &id,
                RenderEvent {
                    last_would_render: Some(when),
                    last_did_render: None,
                    ..RenderEvent::default()
                },
            );
        }
        self.notify_rendered().await;
    }

    pub async fn notify_rendered(&self) {
        self.rendered_tx.send(()).await.expect("rendered channel");
    }

    pub async fn notify_events(&self) {
        self.events_tx.send(()).await.expect("events channel");
    }
}

/// Factory handing the sender halves back to the test through a shared slot.
pub struct MockFactory {
    slot: Arc<Mutex<Option<EngineHarness>>>,
}

impl RunnerFactory for MockFactory {
    fn create(&self, config: RunnerConfig) -> Result<RunnerHandle, EngineError> {
        let (errors_tx, errors) = mpsc::channel(8);
        let (rendered_tx, rendered) = mpsc::channel(8);
        let (events_tx, events) = mpsc::channel(8);
        let (done_tx, done) = mpsc::channel(1);

        let mapping = config
            .templates
            .iter()
            .map(|t| (t.id(), vec![t.clone()]))
            .collect();
        let runner = Arc::new(MockRunner::new(mapping));

        *self.slot.lock().unwrap() = Some(EngineHarness {
            runner: Arc::clone(&runner),
            errors_tx,
            rendered_tx,
            events_tx,
            done_tx,
        });

        Ok(RunnerHandle {
            runner,
            channels: RunnerChannels {
                errors,
                rendered,
                events,
                done,
            },
        })
    }
}

#[derive(Clone, Debug)]
pub enum LifecycleCall {
    Kill(TaskEvent),
    Signal(TaskEvent, String),
    Restart(TaskEvent, bool),
    Exec(String, Vec<String>),
}

/// Lifecycle collaborator that records calls and returns scripted results.
pub struct RecordingLifecycle {
    pub calls: Mutex<Vec<LifecycleCall>>,
    pub running: AtomicBool,
    pub exec_exit_code: AtomicI32,
    pub fail_signals: AtomicBool,
}

impl Default for RecordingLifecycle {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
            exec_exit_code: AtomicI32::new(0),
            fail_signals: AtomicBool::new(false),
        }
    }
}

impl RecordingLifecycle {
    pub fn kills(&self) -> Vec<TaskEvent> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                LifecycleCall::Kill(ev) => Some(ev.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn signals(&self) -> Vec<(TaskEvent, String)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                LifecycleCall::Signal(ev, name) => Some((ev.clone(), name.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn restarts(&self) -> Vec<(TaskEvent, bool)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                LifecycleCall::Restart(ev, fail) => Some((ev.clone(), *fail)),
                _ => None,
            })
            .collect()
    }

    pub fn execs(&self) -> Vec<(String, Vec<String>)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                LifecycleCall::Exec(cmd, args) => Some((cmd.clone(), args.clone())),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl TaskLifecycle for RecordingLifecycle {
    async fn kill(&self, event: TaskEvent) {
        self.calls.lock().unwrap().push(LifecycleCall::Kill(event));
    }

    async fn signal(&self, event: TaskEvent, signal: &str) -> Result<(), LifecycleError> {
        self.calls
            .lock()
            .unwrap()
            .push(LifecycleCall::Signal(event, signal.to_string()));
        if self.fail_signals.load(Ordering::SeqCst) {
            return Err(LifecycleError("signal delivery refused".to_string()));
        }
        Ok(())
    }

    async fn restart(&self, event: TaskEvent, fail: bool) {
        self.calls
            .lock()
            .unwrap()
            .push(LifecycleCall::Restart(event, fail));
    }

    async fn exec(
        &self,
        _timeout: Duration,
        command: &str,
        args: &[String],
    ) -> Result<ExecResult, LifecycleError> {
        self.calls
            .lock()
            .unwrap()
            .push(LifecycleCall::Exec(command.to_string(), args.to_vec()));
        Ok(ExecResult {
            output: Vec::new(),
            exit_code: self.exec_exit_code.load(Ordering::SeqCst),
        })
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<TaskEvent>>,
}

impl RecordingSink {
    pub fn snapshot(&self) -> Vec<TaskEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: TaskEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Env builder over the temp task directory, recording published maps.
pub struct RecordingEnvBuilder {
    task_dir: std::path::PathBuf,
    vars: Mutex<HashMap<String, String>>,
    pub published: Mutex<Vec<HashMap<String, String>>>,
}

impl RecordingEnvBuilder {
    pub fn new(task_dir: &Path) -> Self {
        Self {
            task_dir: task_dir.to_path_buf(),
            vars: Mutex::new(HashMap::new()),
            published: Mutex::new(Vec::new()),
        }
    }
}

impl EnvBuilder for RecordingEnvBuilder {
    fn build(&self) -> TaskEnv {
        TaskEnv::new(&self.task_dir, self.vars.lock().unwrap().clone())
    }

    fn set_template_env(&self, env: HashMap<String, String>) {
        self.published.lock().unwrap().push(env);
    }
}

/// One fully wired manager over a temp task directory.
pub struct Harness {
    pub manager: TaskTemplateManager,
    pub lifecycle: Arc<RecordingLifecycle>,
    pub sink: Arc<RecordingSink>,
    pub env_builder: Arc<RecordingEnvBuilder>,
    pub latch: StartLatch,
    pub task_dir: TempDir,
    engine: Arc<Mutex<Option<EngineHarness>>>,
}

impl Harness {
    pub fn engine(&self) -> EngineHarness {
        self.engine
            .lock()
            .unwrap()
            .take()
            .expect("engine was never constructed")
    }

    pub fn engine_constructed(&self) -> bool {
        self.engine.lock().unwrap().is_some()
    }
}

/// Build a manager for `templates`, letting `tweak` adjust config and
/// collaborators before construction.
pub fn harness_with(
    templates: Vec<TemplateSpec>,
    tweak: impl FnOnce(&mut ManagerConfig),
) -> Result<Harness, ttm_core::TemplateError> {
    let task_dir = TempDir::new().expect("task dir");
    let lifecycle = Arc::new(RecordingLifecycle::default());
    let sink = Arc::new(RecordingSink::default());
    let env_builder = Arc::new(RecordingEnvBuilder::new(task_dir.path()));
    let latch = StartLatch::new();
    let engine = Arc::new(Mutex::new(None));

    let mut config = ManagerConfig {
        unblock: latch.clone(),
        lifecycle: lifecycle.clone(),
        events: sink.clone(),
        env_builder: env_builder.clone(),
        runner_factory: Arc::new(MockFactory {
            slot: engine.clone(),
        }),
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
        task_dir: task_dir.path().to_path_buf(),
        task_id: "web".to_string(),
        max_template_event_rate: Duration::from_millis(50),
    };
    tweak(&mut config);

    let manager = TaskTemplateManager::new(config)?;
    Ok(Harness {
        manager,
        lifecycle,
        sink,
        env_builder,
        latch,
        task_dir,
        engine,
    })
}

/// Poll `check` until it returns true or the deadline passes.
pub async fn wait_for(what: &str, mut check: impl FnMut() -> bool) {
    let deadline = Duration::from_secs(2);
    let poll = async {
        loop {
            if check() {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
    };
    timeout(deadline, poll)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

/// Sleep long enough for any in-flight dispatch to settle.
pub async fn settle() {
    sleep(Duration::from_millis(120)).await;
}
