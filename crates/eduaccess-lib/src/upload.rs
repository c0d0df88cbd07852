//! Request-scoped storage for uploaded files.
//!
//! Each upload gets a `<hex>_<sanitized>` name so concurrent requests with the
//! same client filename never share a path. The file lives exactly as long as
//! its [`TempUpload`] guard.

use std::path::{Path, PathBuf};

use eduaccess_core::filename::upload_filename;

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `data` under a fresh name derived from `client_name`.
    pub async fn save(&self, client_name: &str, data: &[u8]) -> std::io::Result<TempUpload> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(upload_filename(client_name));
        // Guard first, so a failed write still cleans up a partial file.
        let upload = TempUpload { path };
        tokio::fs::write(&upload.path, data).await?;
        tracing::debug!(path = %upload.path.display(), bytes = data.len(), "upload stored");
        Ok(upload)
    }
}

/// Owns a temporary upload; the file is removed on drop.
///
/// Removal is a single synchronous unlink, run inline even on a runtime
/// worker so the file is gone by the time the handler's response is sent.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "upload removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to remove upload")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_exists_while_guard_lives() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let upload = store.save("notes.txt", b"hello").await.unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.is_file());
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        assert!(path.file_name().unwrap().to_str().unwrap().ends_with("_notes.txt"));

        drop(upload);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn same_client_name_gets_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let a = store.save("clip.mp4", b"a").await.unwrap();
        let b = store.save("clip.mp4", b"b").await.unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(std::fs::read(a.path()).unwrap(), b"a");
        assert_eq!(std::fs::read(b.path()).unwrap(), b"b");
    }

    #[tokio::test]
    async fn traversal_names_stay_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let upload = store.save("../../evil.sh", b"x").await.unwrap();
        assert_eq!(upload.path().parent().unwrap(), dir.path());
    }

    #[tokio::test]
    async fn non_ascii_name_keeps_extension_for_extraction() {
        use crate::extract::{DocumentExtractor, TextExtractor};

        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());

        let upload = store.save("日本語.txt", "こんにちは".as_bytes()).await.unwrap();
        assert_eq!(upload.path().extension().unwrap(), "txt");

        let text = DocumentExtractor::standard()
            .extract_text(upload.path())
            .await
            .unwrap();
        assert_eq!(text, "こんにちは");
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("nested/uploads"));
        let upload = store.save("a.txt", b"x").await.unwrap();
        assert!(upload.path().is_file());
    }
}
