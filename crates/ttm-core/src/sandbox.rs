//! Filesystem policy for template I/O.
//!
//! Construction-time checks are purely lexical (no filesystem access); the
//! reader/renderer installed into the engine re-verify every path at I/O time
//! so a compromised engine cannot write outside the task directory.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use nix::unistd::{Gid, Uid, chown};
use tracing::{debug, warn};

use ttm_engine::{ReaderFn, RenderInput, RenderResult, RendererFn};

/// Normalize a path lexically, resolving `.` and `..` without touching the
/// filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => out.push(p.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at an absolute root stays at the root.
                if !out.pop() && !out.has_root() {
                    out.push(Component::ParentDir.as_os_str());
                }
            }
            Component::Normal(c) => out.push(c),
        }
    }
    out
}

/// Whether `path` stays inside `root` after lexical normalization.
pub(crate) fn contains_path(root: &Path, path: &Path) -> bool {
    normalize(path).starts_with(normalize(root))
}

/// Build the source reader installed into the engine.
///
/// `sandbox = None` disables confinement and reads directly.
pub(crate) fn sandboxed_reader(task_id: String, sandbox: Option<PathBuf>) -> ReaderFn {
    Arc::new(move |path: &Path| {
        if let Some(root) = &sandbox {
            if !contains_path(root, path) {
                warn!(task = %task_id, path = %path.display(), "refusing template source outside the task directory");
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("template source {} escapes the task directory", path.display()),
                ));
            }
        }
        fs::read(path)
    })
}

/// Build the destination renderer installed into the engine.
///
/// Writes only when the contents changed, then applies permissions and
/// ownership from the translated descriptor. `sandbox = None` disables
/// confinement.
pub(crate) fn sandboxed_renderer(task_id: String, sandbox: Option<PathBuf>) -> RendererFn {
    Arc::new(move |input: &RenderInput| {
        if let Some(root) = &sandbox {
            if !contains_path(root, &input.path) {
                warn!(task = %task_id, path = %input.path.display(), "refusing template destination outside the task directory");
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!(
                        "template destination {} escapes the task directory",
                        input.path.display()
                    ),
                ));
            }
        }

        if let Ok(existing) = fs::read(&input.path) {
            if existing == input.contents {
                return Ok(RenderResult {
                    would_render: true,
                    did_render: false,
                });
            }
        }

        if let Some(parent) = input.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&input.path, &input.contents)?;

        if let Some(mode) = input.perms {
            fs::set_permissions(&input.path, fs::Permissions::from_mode(mode))?;
        }
        if input.uid.is_some() || input.gid.is_some() {
            chown(
                &input.path,
                input.uid.map(Uid::from_raw),
                input.gid.map(Gid::from_raw),
            )?;
        }

        debug!(task = %task_id, path = %input.path.display(), "rendered template destination");
        Ok(RenderResult {
            would_render: true,
            did_render: true,
        })
    })
}
