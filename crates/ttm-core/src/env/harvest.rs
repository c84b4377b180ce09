use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use ttm_model::TemplateSpec;

use crate::env::TaskEnv;

/// Failure while reading a rendered environment file.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("error reading env template {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Collect `KEY=VALUE` pairs from every rendered destination flagged as an
/// environment source.
///
/// Templates are visited in declaration order; later templates overwrite
/// earlier keys. The destinations passed sandbox checks at construction, so a
/// failure here is a missing or malformed file, which the caller escalates to
/// a task kill.
pub fn load_template_env(
    templates: &[TemplateSpec],
    task_env: &TaskEnv,
) -> Result<HashMap<String, String>, HarvestError> {
    let mut all = HashMap::new();
    for template in templates.iter().filter(|t| t.env_vars) {
        let Some(dest) = &template.dest_path else {
            continue;
        };
        let resolved = task_env.write_path(dest);

        let entries = dotenvy::from_path_iter(&resolved.path).map_err(|source| {
            HarvestError::Read {
                path: resolved.path.clone(),
                source,
            }
        })?;
        for entry in entries {
            let (key, value) = entry.map_err(|source| HarvestError::Read {
                path: resolved.path.clone(),
                source,
            })?;
            all.insert(key, value);
        }
    }
    Ok(all)
}
