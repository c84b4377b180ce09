use std::collections::{BTreeSet, HashMap};

use tokio::time::{self, Instant};
use tracing::debug;

use ttm_engine::{RenderEvent, RunnerChannels, TemplateId, TemplateRunner};
use ttm_model::{TaskEvent, TaskEventKind};

use crate::manager::TaskTemplateManager;

/// Missing dependencies named in one telemetry event before switching to a
/// count of the remainder.
const MISSING_DEP_EVENT_LIMIT: usize = 3;

impl TaskTemplateManager {
    /// Block until every template has reached a render decision at least
    /// once, or until shutdown.
    ///
    /// Engine errors kill the task but do not exit the loop: the caller only
    /// observes a definitive shutdown edge once `stop` closes the shutdown
    /// token, so task startup never unblocks prematurely.
    pub(crate) async fn handle_first_render(
        &self,
        runner: &dyn TemplateRunner,
        channels: &mut RunnerChannels,
    ) {
        let inner = &self.inner;

        // Missing-dependency set observed so far; `None` until first populated.
        let mut missing: Option<BTreeSet<String>> = None;
        // Whether a change to `missing` awaits emission on the timer.
        let mut outstanding = false;
        let event_timer = time::sleep(inner.config.max_template_event_rate);
        tokio::pin!(event_timer);

        // Templates whose first decision already wrote to disk. Replayed on
        // gate exit when the task is already running (restart path).
        let mut dirty_events: HashMap<TemplateId, RenderEvent> = HashMap::new();

        let mut errors_open = true;
        let mut rendered_open = true;
        let mut events_open = true;

        'wait: loop {
            tokio::select! {
                _ = inner.shutdown.cancelled() => return,

                err = channels.errors.recv(), if errors_open => {
                    let Some(err) = err else {
                        errors_open = false;
                        continue 'wait;
                    };
                    // Keep looping so the shutdown token, not this error,
                    // decides when callers unblock.
                    self.kill_task(format!("Template failed: {err}")).await;
                }

                msg = channels.rendered.recv(), if rendered_open => {
                    if msg.is_none() {
                        rendered_open = false;
                        continue 'wait;
                    }

                    let events = runner.render_events();
                    // Not every template has produced an event yet.
                    if events.len() < inner.lookup.len() {
                        continue 'wait;
                    }

                    for (id, event) in &events {
                        if event.last_would_render.is_none() {
                            continue 'wait;
                        }
                        if event.is_dirty() {
                            dirty_events.insert(id.clone(), event.clone());
                        }
                    }

                    // A task already running at gate time (restart path) must
                    // still see change actions for renders that hit the disk.
                    if !dirty_events.is_empty() && inner.config.lifecycle.is_running() {
                        let mut handled = HashMap::with_capacity(inner.config.templates.len());
                        self.on_template_rendered(&mut handled, None, &dirty_events).await;
                    }

                    break 'wait;
                }

                msg = channels.events.recv(), if events_open => {
                    if msg.is_none() {
                        events_open = false;
                        continue 'wait;
                    }

                    let events = runner.render_events();
                    let joined: BTreeSet<String> = events
                        .values()
                        .flat_map(|e| e.missing_deps.iter().cloned())
                        .collect();

                    // Unchanged set (treating never-populated as empty).
                    if missing.as_ref().map_or(joined.is_empty(), |m| *m == joined) {
                        continue 'wait;
                    }

                    debug!(task = %inner.config.task_id, missing = joined.len(), "missing dependencies changed");
                    missing = Some(joined);

                    if !outstanding {
                        outstanding = true;
                        event_timer
                            .as_mut()
                            .reset(Instant::now() + inner.config.max_template_event_rate);
                    }
                }

                _ = &mut event_timer, if outstanding => {
                    outstanding = false;
                    let Some(set) = &missing else { continue 'wait };

                    let mut names: Vec<String> = set.iter().cloned().collect();
                    if names.len() > MISSING_DEP_EVENT_LIMIT {
                        let more = names.len() - MISSING_DEP_EVENT_LIMIT;
                        names.truncate(MISSING_DEP_EVENT_LIMIT);
                        names.push(format!("and {more} more"));
                    }

                    inner.config.events.emit(
                        TaskEvent::new(TaskEventKind::Template)
                            .with_display_message(format!("Missing: {}", names.join(", "))),
                    );
                }
            }
        }
    }
}
