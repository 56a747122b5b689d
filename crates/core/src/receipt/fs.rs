//! Filesystem receipt store.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::{ReceiptError, ReceiptStore};

/// Stores receipts as plain files under a directory, created on demand.
pub struct FsReceiptStore {
    dir: PathBuf,
}

impl FsReceiptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ReceiptStore for FsReceiptStore {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, ReceiptError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;

        debug!("Stored receipt at {}", path.display());
        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_creates_dir_and_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsReceiptStore::new(tmp.path().join("comprovantes"));

        let path = store.save("1234_42_1700000000.png", b"fake-image").await.unwrap();

        let contents = tokio::fs::read(&path).await.unwrap();
        assert_eq!(contents, b"fake-image");
        assert!(path.ends_with("1234_42_1700000000.png"));
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsReceiptStore::new(tmp.path());

        store.save("x.png", b"first").await.unwrap();
        let path = store.save("x.png", b"second").await.unwrap();

        let contents = tokio::fs::read(&path).await.unwrap();
        assert_eq!(contents, b"second");
    }
}
