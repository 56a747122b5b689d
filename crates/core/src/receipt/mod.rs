//! Receipt file storage.

mod fs;

pub use fs::*;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for receipt storage operations.
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("Receipt I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for receipt storage backends.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Persist a receipt's bytes under the given file name. Returns the
    /// stored path, as recorded on the order row.
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<String, ReceiptError>;
}

/// Build the file name for a stored receipt. Keeps the original extension
/// when it is a plain alphanumeric token, falling back to `bin` otherwise.
/// The upload's name is untrusted and must not reach the filesystem.
pub fn receipt_file_name(
    order_id: &str,
    submitter_id: &str,
    unix_ts: i64,
    original_name: &str,
) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin");
    format!("{order_id}_{submitter_id}_{unix_ts}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_file_name_keeps_extension() {
        assert_eq!(
            receipt_file_name("1234", "42", 1700000000, "comprovante.png"),
            "1234_42_1700000000.png"
        );
    }

    #[test]
    fn test_receipt_file_name_fallback_extension() {
        assert_eq!(
            receipt_file_name("1234", "42", 1700000000, "comprovante"),
            "1234_42_1700000000.bin"
        );
    }

    #[test]
    fn test_receipt_file_name_rejects_hostile_extension() {
        assert_eq!(
            receipt_file_name("1234", "42", 1700000000, "x.a|b"),
            "1234_42_1700000000.bin"
        );
        assert_eq!(
            receipt_file_name("1234", "42", 1700000000, "x.png "),
            "1234_42_1700000000.bin"
        );
    }
}
