use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::error::{ModelError, ModelResult};

/// Quiescence window applied before a template is rendered.
///
/// Also used client-wide as the operator bound that per-template waits are
/// clamped into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct WaitConfig {
    /// Minimum time to wait before rendering, in milliseconds.
    pub min_ms: Option<u64>,
    /// Maximum time to wait before rendering, in milliseconds.
    pub max_ms: Option<u64>,
}

impl WaitConfig {
    /// Validate that the declared bounds are coherent.
    ///
    /// Rules:
    /// - when both bounds are set, `min_ms` must not exceed `max_ms`.
    pub fn validate(&self) -> ModelResult<()> {
        if let (Some(min), Some(max)) = (self.min_ms, self.max_ms) {
            if min > max {
                return Err(ModelError::InvalidWait(format!(
                    "min {min}ms is greater than max {max}ms"
                )));
            }
        }
        Ok(())
    }
}
