use std::collections::BTreeSet;
use std::time::SystemTime;

/// Render decision reported by the engine for one template identity.
///
/// `None` timestamps mean "never": a template that has not produced a render
/// decision yet has `last_would_render = None`, and one whose decision did not
/// touch the disk keeps `last_did_render = None`. `Option`'s total order makes
/// `None` sort before every concrete timestamp, which is exactly the
/// comparison the dispatcher relies on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderEvent {
    /// When the engine last decided the template *would* render.
    pub last_would_render: Option<SystemTime>,
    /// When the engine last actually wrote the destination.
    pub last_did_render: Option<SystemTime>,
    /// Identifiers of dependencies the engine is still waiting on.
    pub missing_deps: BTreeSet<String>,
}

impl RenderEvent {
    /// Whether this event wrote the destination file.
    pub fn is_dirty(&self) -> bool {
        self.last_did_render.is_some()
    }
}
