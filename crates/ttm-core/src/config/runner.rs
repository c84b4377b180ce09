use std::collections::HashMap;
use std::time::Duration;

use ttm_engine::{
    BasicAuth, ConsulRunnerConfig, NomadRunnerConfig, NomadTransport, RetryPolicy, RunnerConfig,
    TemplateConfig, TemplateWait, TlsConfig, VaultRunnerConfig,
};
use ttm_model::RetryConfig;

use crate::config::ManagerConfig;
use crate::env::TaskEnv;
use crate::error::TemplateError;
use crate::sandbox;

/// Assemble the full rendering-engine configuration for one task.
///
/// Combines the translated descriptors with client-wide settings, per-task
/// credentials, validated retry/wait bounds, and the masked environment.
pub(crate) fn build_runner_config(
    config: &ManagerConfig,
    mut templates: Vec<TemplateConfig>,
    task_env: &TaskEnv,
) -> Result<RunnerConfig, TemplateError> {
    let client = &config.client;

    // Global default wait, validated before hand-off.
    let wait = match &client.wait {
        Some(w) => {
            w.validate()?;
            Some(TemplateWait {
                enabled: w.min_ms.is_some() || w.max_ms.is_some(),
                min: w.min_ms.map(Duration::from_millis),
                max: w.max_ms.map(Duration::from_millis),
            })
        }
        None => None,
    };

    // Clamp template-specific waits into the operator bounds.
    if let Some(bounds) = &client.wait_bounds {
        bounds.validate()?;
        let min_bound = bounds.min_ms.map(Duration::from_millis);
        let max_bound = bounds.max_ms.map(Duration::from_millis);

        for template in &mut templates {
            let Some(wait) = &mut template.wait else {
                continue;
            };
            if !wait.enabled {
                continue;
            }
            if let (Some(bound), Some(min)) = (min_bound, wait.min) {
                if min < bound {
                    wait.min = Some(bound);
                }
            }
            if let (Some(bound), Some(max)) = (max_bound, wait.max) {
                if max > bound {
                    wait.max = Some(bound);
                }
            }
        }
    }

    let consul = match &config.consul {
        Some(cc) => {
            let mut section = ConsulRunnerConfig {
                address: cc.addr.clone(),
                // A missing workload-identity token is the empty string.
                token: config.consul_token.clone(),
                namespace: cc.namespace.clone(),
                ..ConsulRunnerConfig::default()
            };

            if cc.enable_ssl {
                section.ssl = TlsConfig {
                    enabled: true,
                    verify: cc.verify_ssl,
                    cert: cc.cert_file.clone(),
                    key: cc.key_file.clone(),
                    ca_cert: cc.ca_file.clone(),
                    ca_path: None,
                    server_name: None,
                };
            }

            if let Some(auth) = &cc.auth {
                section.auth = Some(parse_basic_auth(auth)?);
            }

            if let Some(retry) = &client.consul_retry {
                section.retry = Some(retry_policy(retry)?);
            }

            // Task-level namespace wins over the agent's.
            if !config.consul_namespace.is_empty() {
                section.namespace = Some(config.consul_namespace.clone());
            }

            Some(section)
        }
        None => None,
    };

    // Start from an explicitly inert secret-store section so nothing leaks in
    // from the process environment: renewal off, empty token.
    let mut vault = VaultRunnerConfig::default();
    if let Some(vc) = config.vault.as_ref().filter(|vc| vc.is_enabled()) {
        vault.address = Some(vc.addr.clone());
        vault.token = config.vault_token.clone();

        vault.namespace = vc.namespace.clone();
        if !config.vault_namespace.is_empty() {
            vault.namespace = Some(config.vault_namespace.clone());
        }

        if vc.addr.starts_with("https") || vc.tls_cert_file.is_some() {
            vault.ssl = TlsConfig {
                enabled: true,
                verify: !vc.tls_skip_verify,
                cert: vc.tls_cert_file.clone(),
                key: vc.tls_key_file.clone(),
                ca_cert: vc.tls_ca_file.clone(),
                ca_path: vc.tls_ca_path.clone(),
                server_name: vc.tls_server_name.clone(),
            };
        }

        if let Some(retry) = &client.vault_retry {
            vault.retry = Some(retry_policy(retry)?);
        }
    }

    let mut nomad = NomadRunnerConfig {
        namespace: config.nomad_namespace.clone(),
        token: config.nomad_token.clone(),
        ..NomadRunnerConfig::default()
    };
    if let Some(transport) = &client.nomad_transport {
        nomad.transport = Some(NomadTransport {
            address: transport.address.clone(),
            unix_socket: transport.unix_socket.clone(),
        });
    }
    if let Some(retry) = &client.nomad_retry {
        nomad.retry = Some(retry_policy(retry)?);
    }

    let sandbox_root = (!client.disable_sandbox).then(|| config.task_dir.clone());

    Ok(RunnerConfig {
        templates,
        once: config.once_mode_enabled(),
        block_query_wait: client.block_query_wait_ms.map(Duration::from_millis),
        max_stale: client.max_stale_ms.map(Duration::from_millis),
        wait,
        consul,
        vault,
        nomad,
        env: mask_process_env(task_env.all()),
        reader: sandbox::sandboxed_reader(config.task_id.clone(), sandbox_root.clone()),
        renderer: sandbox::sandboxed_renderer(config.task_id.clone(), sandbox_root),
    })
}

/// Mask away every process environment variable not defined by the task.
///
/// The engine falls back to the process environment for variables missing
/// from its map, so each ambient variable gets an explicit empty entry. This
/// is a security contract, not an optimization.
pub(crate) fn mask_process_env(mut env: HashMap<String, String>) -> HashMap<String, String> {
    for (key, _) in std::env::vars() {
        env.entry(key).or_default();
    }
    env
}

fn parse_basic_auth(raw: &str) -> Result<BasicAuth, TemplateError> {
    let (username, password) = raw
        .split_once(':')
        .ok_or_else(|| TemplateError::BadAuth(raw.to_string()))?;
    Ok(BasicAuth {
        username: username.to_string(),
        password: password.to_string(),
    })
}

fn retry_policy(retry: &RetryConfig) -> Result<RetryPolicy, TemplateError> {
    retry.validate()?;
    Ok(RetryPolicy {
        attempts: retry.attempts,
        backoff: retry.backoff_ms.map(Duration::from_millis),
        max_backoff: retry.max_backoff_ms.map(Duration::from_millis),
    })
}
