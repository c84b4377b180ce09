use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

/// Agent-level configuration-store settings used when building the engine
/// configuration for a task.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct ConsulConfig {
    /// Address of the local agent.
    pub addr: String,
    /// Agent-level namespace, overridden by any task-level namespace.
    pub namespace: Option<String>,
    /// Whether to use TLS when talking to the agent.
    pub enable_ssl: bool,
    /// Whether to verify the agent certificate.
    pub verify_ssl: bool,
    /// CA certificate path.
    pub ca_file: Option<String>,
    /// Client certificate path.
    pub cert_file: Option<String>,
    /// Client key path.
    pub key_file: Option<String>,
    /// HTTP basic auth as a single `user:pass` string.
    pub auth: Option<String>,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8500".to_string(),
            namespace: None,
            enable_ssl: false,
            verify_ssl: true,
            ca_file: None,
            cert_file: None,
            key_file: None,
            auth: None,
        }
    }
}
