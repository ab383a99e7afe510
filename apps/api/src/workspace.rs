//! Per-request scratch files.
//!
//! A `Workspace` names a set of sibling files (`resume_<uuid>.tex`, `.pdf`,
//! `.log`, ...) inside the scratch directory. Nothing is created on
//! allocation; the compiler writes the files. `release` deletes whatever
//! exists and runs at most once, either explicitly or on drop. Handlers call
//! the async `release`; drop falls back to blocking removal.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

/// Every extension pdflatex may leave next to the source.
const EXTENSIONS: &[&str] = &["tex", "pdf", "log", "aux", "out", "toc", "nav", "snm", "fls"];

#[derive(Debug)]
pub struct Workspace {
    id: Uuid,
    dir: PathBuf,
    base_name: String,
    released: bool,
}

impl Workspace {
    /// Reserves a uniquely named file set under `dir`.
    pub fn allocate(dir: &Path) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            dir: dir.to_path_buf(),
            base_name: format!("resume_{id}"),
            released: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_with(&self, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{extension}", self.base_name))
    }

    pub fn source_path(&self) -> PathBuf {
        self.path_with("tex")
    }

    pub fn output_path(&self) -> PathBuf {
        self.path_with("pdf")
    }

    pub fn log_path(&self) -> PathBuf {
        self.path_with("log")
    }

    /// All paths this workspace may own.
    pub fn paths(&self) -> Vec<PathBuf> {
        EXTENSIONS.iter().map(|ext| self.path_with(ext)).collect()
    }

    /// Deletes every file of the set that exists. Failures are logged, never
    /// returned, so cleanup cannot mask the outcome of the request.
    pub async fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for path in self.paths() {
            log_removal(&path, tokio::fs::remove_file(&path).await);
        }
    }

    fn release_blocking(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for path in self.paths() {
            log_removal(&path, std::fs::remove_file(&path));
        }
    }
}

fn log_removal(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Error removing temp file {}: {e}", path.display()),
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release_blocking();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::allocate(dir.path());
        let stem = format!("resume_{}", ws.id());
        assert_eq!(ws.source_path(), dir.path().join(format!("{stem}.tex")));
        assert_eq!(ws.output_path(), dir.path().join(format!("{stem}.pdf")));
        assert_eq!(ws.log_path(), dir.path().join(format!("{stem}.log")));
        assert!(ws.paths().iter().all(|p| p.parent() == Some(dir.path())));
        assert!(ws.paths().contains(&ws.source_path()));
    }

    #[test]
    fn test_allocations_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = Workspace::allocate(dir.path());
        let b = Workspace::allocate(dir.path());
        assert_ne!(a.source_path(), b.source_path());
    }

    #[tokio::test]
    async fn test_release_removes_existing_files_and_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut ws = Workspace::allocate(dir.path());
        std::fs::write(ws.source_path(), "tex").unwrap();
        std::fs::write(ws.output_path(), "pdf").unwrap();
        std::fs::write(dir.path().join("unrelated.txt"), "keep").unwrap();

        ws.release().await;

        assert!(ws.paths().iter().all(|p| !p.exists()));
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[test]
    fn test_drop_releases() {
        let dir = tempfile::tempdir().unwrap();
        let source = {
            let ws = Workspace::allocate(dir.path());
            std::fs::write(ws.source_path(), "tex").unwrap();
            std::fs::write(ws.log_path(), "log").unwrap();
            ws.source_path()
        };
        assert!(!source.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_release_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut ws = Workspace::allocate(dir.path());
        ws.release().await;
        // A file written after release is no longer owned by the workspace.
        std::fs::write(ws.source_path(), "late").unwrap();
        drop(ws);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_release_with_missing_directory_does_not_panic() {
        let mut ws = Workspace::allocate(Path::new("/nonexistent/scratch"));
        ws.release().await;
    }

    #[tokio::test]
    async fn test_release_removes_every_compiler_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut ws = Workspace::allocate(dir.path());
        for path in ws.paths() {
            tokio::fs::write(&path, "x").await.unwrap();
        }

        ws.release().await;

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
