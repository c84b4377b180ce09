use std::collections::HashMap;
use std::str::FromStr;

use nix::sys::signal::Signal;

use ttm_model::TemplateSpec;

use crate::error::TemplateError;

/// Lookup from declared change-signal names to concrete OS signals.
///
/// Built once at manager construction from the deduplicated set of signal
/// names across all specs; an unparseable name fails construction.
#[derive(Debug, Default)]
pub struct SignalTable {
    table: HashMap<String, Signal>,
}

impl SignalTable {
    pub fn from_specs(specs: &[TemplateSpec]) -> Result<Self, TemplateError> {
        let mut table = HashMap::new();
        for spec in specs {
            let Some(name) = spec.change_mode.signal_name() else {
                continue;
            };
            if table.contains_key(name) {
                continue;
            }
            let signal =
                parse_signal(name).ok_or_else(|| TemplateError::BadSignal(name.to_string()))?;
            table.insert(name.to_string(), signal);
        }
        Ok(Self { table })
    }

    pub fn get(&self, name: &str) -> Option<Signal> {
        self.table.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Parse a signal name, tolerating case and a missing `SIG` prefix.
fn parse_signal(name: &str) -> Option<Signal> {
    let upper = name.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }
    let full = if upper.starts_with("SIG") {
        upper
    } else {
        format!("SIG{upper}")
    };
    Signal::from_str(&full).ok()
}
