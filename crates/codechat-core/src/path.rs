//! Path resolver: keeps every file access inside the project root.

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::error::{GatewayError, Result};

/// Resolves caller-supplied relative paths against a fixed project root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Canonicalize `root` once. Fails if the root does not exist.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = std::fs::canonicalize(root.as_ref())?;
        Ok(Self { root })
    }

    /// The canonical project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `raw` to a canonical absolute path inside the root.
    ///
    /// `raw` must already be URL-decoded. The target does not need to exist:
    /// the deepest existing ancestor is canonicalized (following symlinks)
    /// and the missing tail is appended, so a missing file still resolves
    /// and is reported later as not found.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf> {
        let lexical = normalize_lexically(&self.root.join(raw));
        if !lexical.starts_with(&self.root) {
            debug!(raw, "path escapes project root");
            return Err(GatewayError::invalid_path(format!(
                "{raw:?} is outside the project root"
            )));
        }

        let canonical = canonicalize_existing(&lexical)
            .map_err(|e| GatewayError::invalid_path(format!("cannot resolve {raw:?}: {e}")))?;
        if !canonical.starts_with(&self.root) {
            debug!(raw, resolved = %canonical.display(), "symlink escapes project root");
            return Err(GatewayError::invalid_path(format!(
                "{raw:?} is outside the project root"
            )));
        }

        Ok(canonical)
    }
}

/// Drop `.` and apply `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest.
fn canonicalize_existing(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path.to_path_buf();
    let mut tail: Vec<OsString> = Vec::new();

    loop {
        match std::fs::canonicalize(&existing) {
            Ok(mut resolved) => {
                resolved.extend(tail.iter().rev());
                return Ok(resolved);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.file_name(), existing.parent()) {
                    (Some(name), Some(parent)) => {
                        tail.push(name.to_os_string());
                        existing = parent.to_path_buf();
                    }
                    _ => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    }
}
