use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::sandbox;

/// Snapshot of a task's environment plus its sandbox root.
///
/// Used to expand `${VAR}` references in declared paths and to resolve those
/// paths against the task directory with escape detection.
#[derive(Clone, Debug)]
pub struct TaskEnv {
    task_dir: PathBuf,
    vars: HashMap<String, String>,
}

/// A declared path after expansion and sandbox resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: PathBuf,
    /// The resolved path lies outside the task directory.
    pub escapes: bool,
}

impl TaskEnv {
    pub fn new(task_dir: impl Into<PathBuf>, vars: HashMap<String, String>) -> Self {
        Self {
            task_dir: task_dir.into(),
            vars,
        }
    }

    pub fn task_dir(&self) -> &Path {
        &self.task_dir
    }

    /// All variables as an owned map.
    pub fn all(&self) -> HashMap<String, String> {
        self.vars.clone()
    }

    /// Expand `${VAR}` references against the task environment.
    ///
    /// Unknown variables are left verbatim so a typo is visible in the
    /// resulting path instead of silently vanishing.
    pub fn interpolate(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    match self.vars.get(name) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str("${");
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Resolve a template source path for reading.
    pub fn read_path(&self, raw: &str) -> ResolvedPath {
        self.resolve(raw)
    }

    /// Resolve a template destination path for writing.
    pub fn write_path(&self, raw: &str) -> ResolvedPath {
        self.resolve(raw)
    }

    fn resolve(&self, raw: &str) -> ResolvedPath {
        let expanded = self.interpolate(raw);
        let candidate = Path::new(&expanded);
        let path = if candidate.is_absolute() {
            sandbox::normalize(candidate)
        } else {
            sandbox::normalize(&self.task_dir.join(candidate))
        };
        let escapes = !sandbox::contains_path(&self.task_dir, &path);
        ResolvedPath { path, escapes }
    }
}

/// Builds the environment the task (and the rendering engine) observe.
///
/// The manager publishes harvested template variables back through
/// `set_template_env`; the next `build` must reflect them.
pub trait EnvBuilder: Send + Sync {
    fn build(&self) -> TaskEnv;
    fn set_template_env(&self, env: HashMap<String, String>);
}
