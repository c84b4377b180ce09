use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, SystemTime};

use rand::Rng;
use tokio::time;
use tracing::debug;

use ttm_engine::{RenderEvent, RunnerChannels, TemplateId, TemplateRunner};
use ttm_model::{ChangeMode, ChangeScript, TaskEvent, TaskEventKind};

use crate::manager::TaskTemplateManager;

impl TaskTemplateManager {
    /// Steady-state loop applied after first render.
    ///
    /// `all_rendered` is the instant every template had rendered; render
    /// events from before it are recorded but never acted on.
    pub(crate) async fn handle_rerenders(
        &self,
        runner: &dyn TemplateRunner,
        channels: &mut RunnerChannels,
        all_rendered: Option<SystemTime>,
    ) {
        let inner = &self.inner;

        // Last acted-upon write timestamp per template identity.
        let mut handled: HashMap<TemplateId, Option<SystemTime>> =
            HashMap::with_capacity(inner.config.templates.len());

        let mut errors_open = true;
        let mut rendered_open = true;

        loop {
            tokio::select! {
                _ = inner.shutdown.cancelled() => return,

                // The engine finished on its own (once mode).
                _ = channels.done.recv() => return,

                err = channels.errors.recv(), if errors_open => {
                    let Some(err) = err else {
                        errors_open = false;
                        continue;
                    };
                    // As in the gate: kill, but let shutdown end the loop.
                    self.kill_task(format!("Template failed: {err}")).await;
                }

                msg = channels.rendered.recv(), if rendered_open => {
                    if msg.is_none() {
                        rendered_open = false;
                        continue;
                    }
                    let events = runner.render_events();
                    self.on_template_rendered(&mut handled, all_rendered, &events).await;
                }
            }
        }
    }

    /// Classify one batch of render events and apply the coalesced change
    /// actions.
    pub(crate) async fn on_template_rendered(
        &self,
        handled: &mut HashMap<TemplateId, Option<SystemTime>>,
        all_rendered: Option<SystemTime>,
        events: &HashMap<TemplateId, RenderEvent>,
    ) {
        let inner = &self.inner;

        let mut handling: Vec<TemplateId> = Vec::new();
        let mut signals: BTreeSet<String> = BTreeSet::new();
        let mut scripts: Vec<ChangeScript> = Vec::new();
        let mut restart = false;
        let mut splay = Duration::ZERO;

        for (id, event) in events {
            // Render from before steady state began: record, never act.
            if all_rendered >= event.last_did_render {
                handled.insert(id.clone(), all_rendered);
                continue;
            }

            // Already acted on this write.
            if handled.get(id).copied().flatten() >= event.last_did_render {
                continue;
            }

            let Some(templates) = inner.lookup.get(id) else {
                self.kill_task(format!(
                    "Template runner returned unknown template id {id:?}"
                ))
                .await;
                return;
            };

            // Re-harvest env templates so dependent processes see fresh values.
            match crate::env::load_template_env(
                &inner.config.templates,
                &inner.config.env_builder.build(),
            ) {
                Ok(env) => inner.config.env_builder.set_template_env(env),
                Err(err) => {
                    self.kill_task(format!(
                        "Template failed to read environment variables: {err}"
                    ))
                    .await;
                    return;
                }
            }

            for template in templates {
                match &template.change_mode {
                    ChangeMode::Signal { signal } => {
                        signals.insert(signal.clone());
                    }
                    ChangeMode::Restart => restart = true,
                    ChangeMode::Script(script) => scripts.push(script.clone()),
                    ChangeMode::Noop => continue,
                }

                let template_splay = Duration::from_millis(template.splay_ms);
                if template_splay > splay {
                    splay = template_splay;
                }
            }

            handling.push(id.clone());
        }

        if !restart && signals.is_empty() && scripts.is_empty() {
            return;
        }

        // De-synchronize change actions across tasks rendering the same data.
        if !splay.is_zero() {
            let offset = {
                let mut rng = rand::thread_rng();
                Duration::from_nanos(rng.gen_range(0..splay.as_nanos() as u64))
            };
            debug!(task = %inner.config.task_id, offset_ms = offset.as_millis() as u64, "applying splay before change actions");
            tokio::select! {
                _ = time::sleep(offset) => {}
                _ = inner.shutdown.cancelled() => return,
            }
        }

        for id in &handling {
            if let Some(event) = events.get(id) {
                handled.insert(id.clone(), event.last_did_render);
            }
        }

        if restart {
            // A restart makes signals and scripts from the same batch moot.
            inner
                .config
                .lifecycle
                .restart(
                    TaskEvent::new(TaskEventKind::RestartSignal)
                        .with_display_message("Template with change_mode restart re-rendered"),
                    false,
                )
                .await;
        } else {
            self.handle_change_mode_signals(&signals).await;
            self.run_change_scripts(scripts).await;
        }
    }

    /// Deliver each distinct change signal, killing the task if any delivery
    /// failed.
    async fn handle_change_mode_signals(&self, signals: &BTreeSet<String>) {
        let inner = &self.inner;

        let mut failures: Vec<String> = Vec::new();
        for name in signals {
            let Some(signal) = inner.signals.get(name) else {
                // Unreachable: parsed at construction.
                continue;
            };

            let event = TaskEvent::new(TaskEventKind::Signaling)
                .with_task_signal(signal.as_str())
                .with_display_message("Template re-rendered");

            if let Err(err) = inner.config.lifecycle.signal(event, name).await {
                failures.push(format!("{name}: {err}"));
            }
        }

        if failures.is_empty() {
            return;
        }

        let tokens: Vec<&str> = signals
            .iter()
            .filter_map(|name| inner.signals.get(name).map(|s| s.as_str()))
            .collect();
        self.kill_task(format!(
            "Template failed to send signals {tokens:?}: {}",
            failures.join("; ")
        ))
        .await;
    }
}
