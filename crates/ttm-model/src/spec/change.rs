use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

/// Action applied to the task when a template's rendered content changes.
///
/// Variants:
/// - `Noop`: render the file and do nothing else.
/// - `Signal`: deliver the named OS signal to the task.
/// - `Restart`: restart the task.
/// - `Script`: execute a script inside the task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum ChangeMode {
    Noop,
    Signal { signal: String },
    Restart,
    Script(ChangeScript),
}

impl Default for ChangeMode {
    fn default() -> Self {
        ChangeMode::Restart
    }
}

impl ChangeMode {
    /// Check whether this mode performs no action on re-render.
    pub fn is_noop(&self) -> bool {
        matches!(self, ChangeMode::Noop)
    }

    /// Get the declared change-signal name, if this is a signal mode.
    pub fn signal_name(&self) -> Option<&str> {
        match self {
            ChangeMode::Signal { signal } => Some(signal),
            _ => None,
        }
    }
}

/// Script executed inside the task when a template re-renders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChangeScript {
    /// Path of the command, resolved inside the task.
    pub command: String,
    /// Command-line arguments passed to the command.
    #[serde(default)]
    pub args: Vec<String>,
    /// Hard timeout for one script run in milliseconds.
    pub timeout_ms: u64,
    /// Whether a failed script run should fail (kill) the task.
    #[serde(default)]
    pub fail_on_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_mode_is_restart() {
        assert_eq!(ChangeMode::default(), ChangeMode::Restart);
    }

    #[test]
    fn signal_name_only_for_signal_mode() {
        let m = ChangeMode::Signal {
            signal: "SIGHUP".to_string(),
        };
        assert_eq!(m.signal_name(), Some("SIGHUP"));
        assert!(ChangeMode::Restart.signal_name().is_none());
        assert!(ChangeMode::Noop.signal_name().is_none());
    }

    #[test]
    fn serde_tagged_roundtrip() {
        let m = ChangeMode::Script(ChangeScript {
            command: "/bin/reload".to_string(),
            args: vec!["-v".to_string()],
            timeout_ms: 5_000,
            fail_on_error: true,
        });

        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"mode\":\"script\""));

        let back: ChangeMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn serde_noop_is_bare_tag() {
        let json = r#"{"mode":"noop"}"#;
        let m: ChangeMode = serde_json::from_str(json).unwrap();
        assert!(m.is_noop());
    }
}
