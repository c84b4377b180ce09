mod change;
mod template;
mod wait;

pub use change::{ChangeMode, ChangeScript};
pub use template::TemplateSpec;
pub use wait::WaitConfig;
