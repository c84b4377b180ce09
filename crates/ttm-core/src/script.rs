use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::warn;

use ttm_model::{ChangeScript, TaskEvent, TaskEventKind};

use crate::lifecycle::{EventSink, TaskLifecycle};
use crate::manager::TaskTemplateManager;

impl TaskTemplateManager {
    /// Run one batch of change-mode scripts concurrently and join before
    /// returning control to the dispatcher.
    pub(crate) async fn run_change_scripts(&self, scripts: Vec<ChangeScript>) {
        if scripts.is_empty() {
            return;
        }

        let mut batch = JoinSet::new();
        for script in scripts {
            let lifecycle = Arc::clone(&self.inner.config.lifecycle);
            let events = Arc::clone(&self.inner.config.events);
            batch.spawn(run_change_script(lifecycle, events, script));
        }
        while batch.join_next().await.is_some() {}
    }
}

async fn run_change_script(
    lifecycle: Arc<dyn TaskLifecycle>,
    events: Arc<dyn EventSink>,
    script: ChangeScript,
) {
    let timeout = Duration::from_millis(script.timeout_ms);
    match lifecycle.exec(timeout, &script.command, &script.args).await {
        Err(err) => {
            let message = format!(
                "Template failed to run script {} with arguments {:?} on change: {}. Exit code: {}",
                script.command, script.args, err, -1,
            );
            script_failure(&lifecycle, &events, &script, message).await;
        }
        Ok(result) if result.exit_code != 0 => {
            let message = format!(
                "Template ran script {} with arguments {:?} on change but it exited with code: {}",
                script.command, script.args, result.exit_code,
            );
            script_failure(&lifecycle, &events, &script, message).await;
        }
        Ok(_) => {
            events.emit(
                TaskEvent::new(TaskEventKind::HookMessage).with_display_message(format!(
                    "Template successfully ran script {} with arguments: {:?}. Exit code: 0",
                    script.command, script.args,
                )),
            );
        }
    }
}

async fn script_failure(
    lifecycle: &Arc<dyn TaskLifecycle>,
    events: &Arc<dyn EventSink>,
    script: &ChangeScript,
    message: String,
) {
    warn!(command = %script.command, "change-mode script failed");
    events.emit(TaskEvent::new(TaskEventKind::HookFailed).with_display_message(message));

    if script.fail_on_error {
        lifecycle
            .kill(
                TaskEvent::new(TaskEventKind::Killing)
                    .with_fails_task()
                    .with_display_message("Template script failed, task is being killed"),
            )
            .await;
    }
}
