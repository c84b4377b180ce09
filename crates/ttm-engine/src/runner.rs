use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::RunnerConfig;
use crate::error::EngineError;
use crate::event::RenderEvent;
use crate::template::TemplateConfig;

/// Identity the engine reports render events under.
pub type TemplateId = String;

/// Control surface of a running (or startable) rendering engine.
///
/// The engine resolves template variables against its backends and writes
/// destination files; the supervisor only observes it through this trait and
/// the channel bundle handed over at construction.
pub trait TemplateRunner: Send + Sync {
    /// Begin watching backends and rendering. Non-blocking; the engine runs
    /// on its own background task.
    fn start(&self);

    /// Stop watching and release backend resources. Idempotent.
    fn stop(&self);

    /// Snapshot of the most recent render decision per template identity.
    fn render_events(&self) -> HashMap<TemplateId, RenderEvent>;

    /// Which translated descriptors share each template identity.
    fn template_mapping(&self) -> HashMap<TemplateId, Vec<TemplateConfig>>;
}

/// Notification channels a rendering engine exposes to its supervisor.
///
/// All carry unit payloads except `errors`; the supervisor pulls the actual
/// event state via [`TemplateRunner::render_events`] after each wakeup.
pub struct RunnerChannels {
    /// Runtime failures. Closed when the engine shuts down.
    pub errors: mpsc::Receiver<EngineError>,
    /// A template's render decision was (re)reached.
    pub rendered: mpsc::Receiver<()>,
    /// A watch event arrived (may carry new missing-dependency state).
    pub events: mpsc::Receiver<()>,
    /// The engine finished on its own (once mode). Closed on completion.
    pub done: mpsc::Receiver<()>,
}

/// A constructed engine: the shared control handle plus the channel bundle,
/// which the supervisor's event loop takes exclusive ownership of.
pub struct RunnerHandle {
    pub runner: Arc<dyn TemplateRunner>,
    pub channels: RunnerChannels,
}

/// Builds a concrete rendering engine from an assembled [`RunnerConfig`].
pub trait RunnerFactory: Send + Sync {
    fn create(&self, config: RunnerConfig) -> Result<RunnerHandle, EngineError>;
}
