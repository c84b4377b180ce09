use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::template::{TemplateConfig, TemplateWait};

/// Reads a template source file on behalf of the engine.
///
/// Installed by the supervisor so source access can be confined to the task
/// sandbox.
pub type ReaderFn = Arc<dyn Fn(&Path) -> io::Result<Vec<u8>> + Send + Sync>;

/// Writes one rendered destination on behalf of the engine.
pub type RendererFn = Arc<dyn Fn(&RenderInput) -> io::Result<RenderResult> + Send + Sync>;

/// One render request handed to the installed [`RendererFn`].
#[derive(Clone, Debug)]
pub struct RenderInput {
    pub path: PathBuf,
    pub contents: Vec<u8>,
    pub perms: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

/// Outcome of one render request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// The contents resolved successfully and the file would be written.
    pub would_render: bool,
    /// The destination was actually (re)written.
    pub did_render: bool,
}

/// Complete configuration the supervisor assembles for a rendering engine.
#[derive(Clone)]
pub struct RunnerConfig {
    pub templates: Vec<TemplateConfig>,
    /// Evaluate templates a single time instead of watching continuously.
    pub once: bool,
    /// Blocking-query duration for backend watches.
    pub block_query_wait: Option<Duration>,
    /// Stale-read threshold allowing queries to be served by followers.
    pub max_stale: Option<Duration>,
    /// Default render wait for templates that declare none.
    pub wait: Option<TemplateWait>,
    pub consul: Option<ConsulRunnerConfig>,
    pub vault: VaultRunnerConfig,
    pub nomad: NomadRunnerConfig,
    /// Environment visible to template functions. The engine must not consult
    /// the process environment for keys present here, including empty ones.
    pub env: HashMap<String, String>,
    pub reader: ReaderFn,
    pub renderer: RendererFn,
}

impl fmt::Debug for RunnerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerConfig")
            .field("templates", &self.templates.len())
            .field("once", &self.once)
            .field("block_query_wait", &self.block_query_wait)
            .field("max_stale", &self.max_stale)
            .field("wait", &self.wait)
            .field("consul", &self.consul)
            .field("vault", &self.vault)
            .field("nomad", &self.nomad)
            .field("env", &self.env.len())
            .finish_non_exhaustive()
    }
}

/// Configuration-store section of the runner configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConsulRunnerConfig {
    pub address: String,
    /// Workload-identity token; may be empty when none was issued.
    pub token: String,
    pub namespace: Option<String>,
    pub ssl: TlsConfig,
    pub auth: Option<BasicAuth>,
    pub retry: Option<RetryPolicy>,
}

/// Secret-store section of the runner configuration.
///
/// Always present so the engine never falls back to ambient process state:
/// token renewal stays off and the token stays empty unless the task opted in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VaultRunnerConfig {
    pub address: Option<String>,
    pub token: String,
    pub renew_token: bool,
    pub namespace: Option<String>,
    pub ssl: TlsConfig,
    pub retry: Option<RetryPolicy>,
}

/// Cluster-API section of the runner configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NomadRunnerConfig {
    pub namespace: String,
    /// Token or identity claim for the task.
    pub token: String,
    pub transport: Option<NomadTransport>,
    pub retry: Option<RetryPolicy>,
}

/// Non-default transport for the cluster API.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NomadTransport {
    pub address: Option<String>,
    pub unix_socket: Option<String>,
}

/// TLS block for one backend section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TlsConfig {
    pub enabled: bool,
    pub verify: bool,
    pub cert: Option<String>,
    pub key: Option<String>,
    pub ca_cert: Option<String>,
    pub ca_path: Option<String>,
    pub server_name: Option<String>,
}

/// Retry behavior for one backend section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: Option<u64>,
    pub backoff: Option<Duration>,
    pub max_backoff: Option<Duration>,
}

/// HTTP basic auth for the configuration store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}
