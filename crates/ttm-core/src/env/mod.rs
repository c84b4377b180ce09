mod harvest;
mod taskenv;

pub use harvest::{HarvestError, load_template_env};
pub use taskenv::{EnvBuilder, ResolvedPath, TaskEnv};
