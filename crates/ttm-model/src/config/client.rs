use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::config::RetryConfig;
use crate::spec::WaitConfig;

/// Template functions refused by default.
///
/// Both run arbitrary code on the client and are only re-enabled by an
/// operator who explicitly trusts every job author.
pub fn default_function_denylist() -> Vec<String> {
    vec!["plugin".to_string(), "writeToFile".to_string()]
}

/// Client-wide template settings shared by every task on the node.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct ClientTemplateConfig {
    /// Bypass sandbox escape checks and sandbox-root rewriting entirely.
    pub disable_sandbox: bool,
    /// Template functions the rendering engine must refuse.
    pub function_denylist: Vec<String>,
    /// Blocking-query duration handed through to the engine, in milliseconds.
    pub block_query_wait_ms: Option<u64>,
    /// Stale-read threshold handed through to the engine, in milliseconds.
    pub max_stale_ms: Option<u64>,
    /// Default render wait applied when a template declares none.
    pub wait: Option<WaitConfig>,
    /// Operator bounds that per-template waits are clamped into.
    pub wait_bounds: Option<WaitConfig>,
    /// Retry behavior for the configuration store.
    pub consul_retry: Option<RetryConfig>,
    /// Retry behavior for the secret store.
    pub vault_retry: Option<RetryConfig>,
    /// Retry behavior for the cluster API.
    pub nomad_retry: Option<RetryConfig>,
    /// Custom transport for the cluster API.
    pub nomad_transport: Option<TransportConfig>,
}

impl Default for ClientTemplateConfig {
    fn default() -> Self {
        Self {
            disable_sandbox: false,
            function_denylist: default_function_denylist(),
            block_query_wait_ms: None,
            max_stale_ms: None,
            wait: None,
            wait_bounds: None,
            consul_retry: None,
            vault_retry: None,
            nomad_retry: None,
            nomad_transport: None,
        }
    }
}

/// Non-default transport used to reach the cluster API, e.g. a local agent
/// socket instead of the advertised address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct TransportConfig {
    /// Override for the API address.
    pub address: Option<String>,
    /// Unix domain socket path to dial instead of TCP.
    pub unix_socket: Option<String>,
}
