//! In-memory receipt store for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::receipt::{ReceiptError, ReceiptStore};

/// Mock implementation of the [`ReceiptStore`] trait. Keeps saved files in
/// memory and reports paths under a fake `comprovantes/` directory.
#[derive(Debug, Default)]
pub struct MemoryReceiptStore {
    saved: Arc<RwLock<Vec<(String, Vec<u8>)>>>,
}

impl MemoryReceiptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all saved files as (name, bytes) pairs.
    pub async fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.read().await.clone()
    }
}

#[async_trait]
impl ReceiptStore for MemoryReceiptStore {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, ReceiptError> {
        self.saved
            .write()
            .await
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(format!("comprovantes/{file_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_records_and_returns_path() {
        let store = MemoryReceiptStore::new();

        let path = store.save("1234_42_1700000000.png", &[1, 2]).await.unwrap();
        assert_eq!(path, "comprovantes/1234_42_1700000000.png");

        let saved = store.saved().await;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].1, vec![1, 2]);
    }
}
