use serde::{Deserialize, Serialize};

#[cfg(feature = "schema")]
use schemars::JsonSchema;

use crate::error::{ModelError, ModelResult};

/// Retry behavior handed through to the rendering engine for one backend.
///
/// `attempts = Some(0)` means retry forever.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Number of attempts before giving up.
    pub attempts: Option<u64>,
    /// Initial backoff between attempts, in milliseconds.
    pub backoff_ms: Option<u64>,
    /// Ceiling for the growing backoff, in milliseconds. `0` disables the cap.
    pub max_backoff_ms: Option<u64>,
}

impl RetryConfig {
    /// Validate that the backoff window is coherent.
    pub fn validate(&self) -> ModelResult<()> {
        if let (Some(backoff), Some(max)) = (self.backoff_ms, self.max_backoff_ms) {
            if max != 0 && backoff > max {
                return Err(ModelError::InvalidRetry(format!(
                    "backoff {backoff}ms is greater than max backoff {max}ms"
                )));
            }
        }
        Ok(())
    }
}
