use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::spec::{ChangeMode, WaitConfig};

/// Declarative specification of one managed template.
///
/// A template maps a source (file path or inline body) to a destination file
/// inside the task sandbox, plus the change action applied when the rendered
/// content changes. Specs are immutable once handed to the manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateSpec {
    /// Source path, resolved relative to the task directory.
    ///
    /// Mutually complementary with `embedded_tmpl`; exactly one of the two is
    /// normally set by the job author.
    pub source_path: Option<String>,
    /// Destination path, resolved relative to the task directory.
    pub dest_path: Option<String>,
    /// Inline template body used instead of a source file.
    pub embedded_tmpl: Option<String>,
    /// Left delimiter override for the rendering engine.
    pub left_delim: Option<String>,
    /// Right delimiter override for the rendering engine.
    pub right_delim: Option<String>,
    /// Whether a missing key is a render error (`true`) or renders empty.
    pub err_missing_key: bool,
    /// Action applied when the rendered content changes.
    pub change_mode: ChangeMode,
    /// Random delay bound applied before the change action, in milliseconds.
    pub splay_ms: u64,
    /// Per-template render wait, clamped into the client-wide bounds.
    pub wait: Option<WaitConfig>,
    /// Destination file permissions as an octal string (e.g. `"0644"`).
    pub perms: Option<String>,
    /// Destination file owner. Negative values mean "leave unset".
    pub uid: Option<i64>,
    /// Destination file group. Negative values mean "leave unset".
    pub gid: Option<i64>,
    /// Render the template once instead of watching continuously.
    pub once: bool,
    /// Treat the rendered destination as a `KEY=VALUE` environment file.
    pub env_vars: bool,
}

impl Default for TemplateSpec {
    fn default() -> Self {
        Self {
            source_path: None,
            dest_path: None,
            embedded_tmpl: None,
            left_delim: None,
            right_delim: None,
            err_missing_key: false,
            change_mode: ChangeMode::default(),
            splay_ms: 0,
            wait: None,
            perms: None,
            uid: None,
            gid: None,
            once: false,
            env_vars: false,
        }
    }
}
