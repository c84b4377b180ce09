use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

/// Agent-level secret-store settings used when building the engine
/// configuration for a task that opts into secrets.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct VaultConfig {
    /// Whether the secret store is available to tasks at all.
    pub enabled: bool,
    /// Address of the secret store.
    pub addr: String,
    /// Agent-level namespace, overridden by any task-level namespace.
    pub namespace: Option<String>,
    /// CA certificate path.
    pub tls_ca_file: Option<String>,
    /// CA certificate directory.
    pub tls_ca_path: Option<String>,
    /// Client certificate path.
    pub tls_cert_file: Option<String>,
    /// Client key path.
    pub tls_key_file: Option<String>,
    /// Expected server name when verifying the certificate.
    pub tls_server_name: Option<String>,
    /// Skip certificate verification.
    pub tls_skip_verify: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: "https://vault.service.consul:8200".to_string(),
            namespace: None,
            tls_ca_file: None,
            tls_ca_path: None,
            tls_cert_file: None,
            tls_key_file: None,
            tls_server_name: None,
            tls_skip_verify: false,
        }
    }
}

impl VaultConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
