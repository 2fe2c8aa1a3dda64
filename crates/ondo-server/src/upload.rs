//! Scoped upload-file lifecycle.
//!
//! Every uploaded file is spooled into the upload directory and owned
//! by an [`UploadGuard`]; the file is removed when the guard drops, so
//! cleanup happens on every exit path, whether the request succeeded
//! or failed partway through.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counter keeping concurrent same-name uploads from
/// colliding on disk.
static SPOOL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// An uploaded file spooled to disk, deleted on drop.
#[derive(Debug)]
pub struct UploadGuard {
    path: PathBuf,
}

impl UploadGuard {
    /// Write `bytes` into `dir` under a collision-free name derived
    /// from the client filename.
    ///
    /// Any directory components in the client filename are discarded;
    /// only its final component is used.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the write fails.
    pub async fn spool(dir: &Path, filename: &str, bytes: &[u8]) -> std::io::Result<Self> {
        let base = Path::new(filename)
            .file_name()
            .map_or_else(|| "upload".to_owned(), |name| name.to_string_lossy().into_owned());
        let sequence = SPOOL_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!("{sequence}_{base}"));
        tokio::fs::write(&path, bytes).await?;
        Ok(Self { path })
    }

    /// Path of the spooled file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if let Err(error) = std::fs::remove_file(&self.path) {
            tracing::debug!(path = %self.path.display(), %error, "spooled upload already gone");
        }
    }
}
