use std::path::PathBuf;
use std::time::Duration;

use crate::runner::TemplateId;

/// One template as the rendering engine consumes it: fully resolved paths,
/// parsed permissions and ownership, and the sandbox root writes must stay
/// inside.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateConfig {
    /// Resolved source path, if the template reads from a file.
    pub source: Option<PathBuf>,
    /// Resolved destination path.
    pub destination: Option<PathBuf>,
    /// Inline template body used instead of a source file.
    pub contents: Option<String>,
    /// Left delimiter override.
    pub left_delim: Option<String>,
    /// Right delimiter override.
    pub right_delim: Option<String>,
    /// Whether a missing key is a render error.
    pub err_missing_key: bool,
    /// Template functions the engine must refuse.
    pub function_denylist: Vec<String>,
    /// Destination permissions (already parsed from octal).
    pub perms: Option<u32>,
    /// Destination owner.
    pub uid: Option<u32>,
    /// Destination group.
    pub gid: Option<u32>,
    /// Render quiescence window.
    pub wait: Option<TemplateWait>,
    /// Root directory template I/O must stay inside; `None` disables the check.
    pub sandbox_path: Option<PathBuf>,
}

impl TemplateConfig {
    /// Stable identity derived from the template inputs.
    ///
    /// Two configs with the same source, destination, body, and delimiters
    /// share an identity; the engine reports render events keyed by it.
    pub fn id(&self) -> TemplateId {
        let mut hasher = blake3::Hasher::new();
        for part in [
            self.source.as_ref().map(|p| p.to_string_lossy().into_owned()),
            self.destination
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            self.contents.clone(),
            self.left_delim.clone(),
            self.right_delim.clone(),
        ] {
            match part {
                Some(s) => {
                    hasher.update(&[1]);
                    hasher.update(s.as_bytes());
                }
                None => {
                    hasher.update(&[0]);
                }
            }
            hasher.update(&[0x1f]);
        }
        hasher.finalize().to_hex()[..16].to_string()
    }
}

/// Render quiescence window for one template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TemplateWait {
    pub enabled: bool,
    pub min: Option<Duration>,
    pub max: Option<Duration>,
}
