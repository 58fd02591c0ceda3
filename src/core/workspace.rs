//! Scratch and persistent directory lifecycle.
//!
//! Each conversion owns two directories: an ephemeral workspace the
//! package is unpacked into, and a persistent media output directory
//! transcoded images land in. The workspace is removed on every exit
//! path; the media directory survives only a successful conversion.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ConvertError;

/// Ephemeral extraction directory, private to one conversion.
///
/// Backed by a uniquely named temp directory, so concurrent conversions
/// can never collide. Removal happens on drop, which covers success,
/// error, and panic paths alike.
pub struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    /// Allocate a fresh scratch directory.
    pub fn acquire() -> Result<Self, ConvertError> {
        let dir = tempfile::Builder::new()
            .prefix("deckport-")
            .tempdir()
            .map_err(|e| {
                ConvertError::Workspace(format!("failed to create scratch directory: {e}"))
            })?;

        debug!(path = %dir.path().display(), "workspace acquired");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the scratch tree now rather than at drop. Removal failure
    /// is logged, never propagated over an in-flight error.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!(path = %path.display(), error = %e, "failed to remove workspace");
        } else {
            debug!(path = %path.display(), "workspace released");
        }
    }
}

/// Persistent, conversion-namespaced media output directory.
///
/// Acts as a guard: dropping it before `persist()` removes the whole
/// directory, so an aborted conversion leaves no partial output behind.
pub struct MediaOutputDir {
    path: PathBuf,
    namespace: String,
    persisted: bool,
}

impl MediaOutputDir {
    /// Create `<media_root>/deck_<token>/`, unique per conversion.
    pub fn allocate(media_root: &Path) -> Result<Self, ConvertError> {
        let namespace = format!("deck_{}", Uuid::new_v4().simple());
        let path = media_root.join(&namespace);

        fs::create_dir_all(&path).map_err(|e| {
            ConvertError::Workspace(format!(
                "failed to create media output directory {}: {e}",
                path.display()
            ))
        })?;

        debug!(path = %path.display(), "media output directory allocated");
        Ok(Self {
            path,
            namespace,
            persisted: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Public namespace segment, e.g. `deck_3f9a…`.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Keep the directory. Called once the conversion has succeeded;
    /// the exported text references files inside it.
    pub fn persist(mut self) -> PathBuf {
        self.persisted = true;
        self.path.clone()
    }
}

impl Drop for MediaOutputDir {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove partial media output");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn workspaces_are_disjoint() {
        let a = Workspace::acquire().unwrap();
        let b = Workspace::acquire().unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().is_dir());
        assert!(b.path().is_dir());
    }

    #[test]
    fn release_removes_the_tree() {
        let ws = Workspace::acquire().unwrap();
        let path = ws.path().to_path_buf();
        fs::write(path.join("file.txt"), b"x").unwrap();
        ws.release();
        assert!(!path.exists());
    }

    #[test]
    fn media_dir_removed_on_drop() {
        let root = TempDir::new().unwrap();
        let path = {
            let dir = MediaOutputDir::allocate(root.path()).unwrap();
            fs::write(dir.path().join("img.jpg"), b"x").unwrap();
            dir.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn media_dir_survives_persist() {
        let root = TempDir::new().unwrap();
        let dir = MediaOutputDir::allocate(root.path()).unwrap();
        let namespace = dir.namespace().to_string();
        let path = dir.persist();
        assert!(path.exists());
        assert!(namespace.starts_with("deck_"));
    }

    #[test]
    fn namespaces_are_unique() {
        let root = TempDir::new().unwrap();
        let a = MediaOutputDir::allocate(root.path()).unwrap();
        let b = MediaOutputDir::allocate(root.path()).unwrap();
        assert_ne!(a.namespace(), b.namespace());
    }
}
