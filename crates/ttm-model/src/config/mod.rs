mod client;
mod consul;
mod retry;
mod vault;

pub use client::{ClientTemplateConfig, TransportConfig, default_function_denylist};
pub use consul::ConsulConfig;
pub use retry::RetryConfig;
pub use vault::VaultConfig;
