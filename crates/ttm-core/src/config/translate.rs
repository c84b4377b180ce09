use std::time::Duration;

use ttm_engine::{TemplateConfig, TemplateWait};
use ttm_model::TemplateSpec;

use crate::config::ManagerConfig;
use crate::env::TaskEnv;
use crate::error::TemplateError;

/// Translate declared template specs into engine descriptors.
///
/// Source and destination are expanded against the task environment and, when
/// sandboxing is enabled, rejected if they resolve outside the task directory.
/// Returns descriptor/spec pairs so the caller can map engine identities back
/// to the declared templates.
pub(crate) fn translate_specs(
    config: &ManagerConfig,
    task_env: &TaskEnv,
) -> Result<Vec<(TemplateConfig, TemplateSpec)>, TemplateError> {
    let sandbox_enabled = !config.client.disable_sandbox;
    let mut out = Vec::with_capacity(config.templates.len());

    for spec in &config.templates {
        let mut descriptor = TemplateConfig {
            contents: spec.embedded_tmpl.clone(),
            left_delim: spec.left_delim.clone(),
            right_delim: spec.right_delim.clone(),
            err_missing_key: spec.err_missing_key,
            function_denylist: config.client.function_denylist.clone(),
            ..TemplateConfig::default()
        };

        if let Some(source) = &spec.source_path {
            let resolved = task_env.read_path(source);
            if resolved.escapes && sandbox_enabled {
                return Err(TemplateError::SourceEscapes);
            }
            descriptor.source = Some(resolved.path);
        }
        if let Some(dest) = &spec.dest_path {
            let resolved = task_env.write_path(dest);
            if resolved.escapes && sandbox_enabled {
                return Err(TemplateError::DestinationEscapes);
            }
            descriptor.destination = Some(resolved.path);
        }

        if let Some(wait) = &spec.wait {
            wait.validate()?;
            descriptor.wait = Some(TemplateWait {
                enabled: true,
                min: wait.min_ms.map(Duration::from_millis),
                max: wait.max_ms.map(Duration::from_millis),
            });
        }

        if let Some(perms) = &spec.perms {
            descriptor.perms = Some(parse_octal_perms(perms)?);
        }
        descriptor.uid = spec.uid.filter(|v| *v >= 0).map(|v| v as u32);
        descriptor.gid = spec.gid.filter(|v| *v >= 0).map(|v| v as u32);

        if sandbox_enabled {
            descriptor.sandbox_path = Some(config.task_dir.clone());
        }

        out.push((descriptor, spec.clone()));
    }

    Ok(out)
}

/// Parse a permission string as base-8 in the 12-bit file mode range.
fn parse_octal_perms(raw: &str) -> Result<u32, TemplateError> {
    u32::from_str_radix(raw, 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
        .ok_or_else(|| TemplateError::BadPermissions(raw.to_string()))
}
