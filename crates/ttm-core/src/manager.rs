use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use ttm_engine::{RunnerChannels, TemplateId, TemplateRunner};
use ttm_model::{TaskEvent, TaskEventKind, TemplateSpec};

use crate::config::{ManagerConfig, build_runner_config, translate_specs};
use crate::env::load_template_env;
use crate::error::TemplateError;
use crate::signals::SignalTable;

/// Supervises the templates of one task.
///
/// Drives an external rendering engine through its channels: holds startup
/// until first render, then applies per-template change actions on every
/// re-render. Cheap to clone; all clones share one instance.
#[derive(Clone)]
pub struct TaskTemplateManager {
    pub(crate) inner: Arc<ManagerInner>,
}

pub(crate) struct ManagerInner {
    pub(crate) config: ManagerConfig,
    /// Engine template identity to the specs rendered under it.
    pub(crate) lookup: HashMap<TemplateId, Vec<TemplateSpec>>,
    pub(crate) signals: SignalTable,
    /// `None` when there are no templates to manage.
    pub(crate) runner: Option<Arc<dyn TemplateRunner>>,
    /// Taken exactly once by [`TaskTemplateManager::run`].
    pub(crate) channels: Mutex<Option<RunnerChannels>>,
    pub(crate) shutdown: CancellationToken,
    stopped: Mutex<bool>,
}

impl TaskTemplateManager {
    /// Build the manager: parse signals, translate specs, and construct the
    /// rendering engine. No engine work starts until [`Self::run`].
    pub fn new(config: ManagerConfig) -> Result<Self, TemplateError> {
        config.validate()?;

        let signals = SignalTable::from_specs(&config.templates)?;

        if config.templates.is_empty() {
            return Ok(Self {
                inner: Arc::new(ManagerInner {
                    config,
                    lookup: HashMap::new(),
                    signals,
                    runner: None,
                    channels: Mutex::new(None),
                    shutdown: CancellationToken::new(),
                    stopped: Mutex::new(false),
                }),
            });
        }

        let task_env = config.env_builder.build();
        let pairs = translate_specs(&config, &task_env)?;

        let mut by_descriptor: HashMap<String, Vec<TemplateSpec>> = HashMap::new();
        for (descriptor, spec) in &pairs {
            by_descriptor
                .entry(descriptor.id())
                .or_default()
                .push(spec.clone());
        }

        let descriptors = pairs.into_iter().map(|(d, _)| d).collect();
        let runner_config = build_runner_config(&config, descriptors, &task_env)?;
        let handle = config.runner_factory.create(runner_config)?;

        let mut lookup: HashMap<TemplateId, Vec<TemplateSpec>> = HashMap::new();
        for (id, descriptors) in handle.runner.template_mapping() {
            for descriptor in descriptors {
                if let Some(specs) = by_descriptor.get(&descriptor.id()) {
                    lookup.entry(id.clone()).or_default().extend(specs.iter().cloned());
                }
            }
        }

        Ok(Self {
            inner: Arc::new(ManagerInner {
                config,
                lookup,
                signals,
                runner: Some(handle.runner),
                channels: Mutex::new(Some(handle.channels)),
                shutdown: CancellationToken::new(),
                stopped: Mutex::new(false),
            }),
        })
    }

    /// The templates under management.
    pub fn templates(&self) -> &[TemplateSpec] {
        &self.inner.config.templates
    }

    /// Stop the manager and its rendering engine. Idempotent.
    ///
    /// This is the only place the engine is stopped: the steady-state loop
    /// leaves it running through the task's kill window so dynamic secrets
    /// keep being renewed.
    pub fn stop(&self) {
        let mut stopped = self.inner.stopped.lock().unwrap();
        if *stopped {
            return;
        }
        *stopped = true;

        debug!(task = %self.inner.config.task_id, "stopping template manager");
        self.inner.shutdown.cancel();
        if let Some(runner) = &self.inner.runner {
            runner.stop();
        }
    }

    /// Long-lived loop handling engine errors and render events.
    ///
    /// Returns when [`Self::stop`] is called, when the engine finishes on its
    /// own (once mode), or immediately after first render when every template
    /// is change-mode noop.
    pub async fn run(&self) {
        let inner = &self.inner;

        // Nothing to manage: unblock startup and leave.
        let Some(runner) = inner.runner.clone() else {
            inner.config.unblock.release();
            return;
        };

        let channels = inner.channels.lock().unwrap().take();
        let Some(mut channels) = channels else {
            debug!(task = %inner.config.task_id, "run called twice; ignoring");
            return;
        };

        // The engine is intentionally not stopped when this function returns;
        // see `stop`.
        runner.start();
        info!(task = %inner.config.task_id, templates = inner.config.templates.len(), "template manager started");

        self.handle_first_render(runner.as_ref(), &mut channels).await;

        if inner.shutdown.is_cancelled() {
            return;
        }

        // Publish env-template variables before the task is released.
        match load_template_env(&inner.config.templates, &inner.config.env_builder.build()) {
            Ok(env) => inner.config.env_builder.set_template_env(env),
            Err(err) => {
                self.kill_task(format!(
                    "Template failed to read environment variables: {err}"
                ))
                .await;
                return;
            }
        }

        inner.config.unblock.release();
        info!(task = %inner.config.task_id, "all templates rendered; task unblocked");

        if self.all_templates_noop() {
            return;
        }

        self.handle_rerenders(runner.as_ref(), &mut channels, Some(SystemTime::now()))
            .await;
    }

    pub(crate) fn all_templates_noop(&self) -> bool {
        self.inner
            .config
            .templates
            .iter()
            .all(|t| t.change_mode.is_noop())
    }

    /// Kill the supervised task with a failing event carrying `message`.
    pub(crate) async fn kill_task(&self, message: String) {
        self.inner
            .config
            .lifecycle
            .kill(
                TaskEvent::new(TaskEventKind::Killing)
                    .with_fails_task()
                    .with_display_message(message),
            )
            .await;
    }
}
