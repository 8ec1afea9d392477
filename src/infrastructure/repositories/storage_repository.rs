use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;

/// Outcome of one upload attempt as reported by the storage backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResult {
    pub success: bool,
    pub remote_status: u16,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage request failed: {0}")]
    Transport(String),
    #[error("invalid object key '{0}'")]
    InvalidKey(String),
}

/// Repository for pushing finished audio to remote object storage
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Upload the file at `local_path` under `key` in a single request.
    ///
    /// A response from the backend always yields `Ok`, with `success` telling
    /// whether it was the expected "created" status. `Err` means the request
    /// never got an answer.
    async fn upload(&self, local_path: &Path, key: &str) -> Result<UploadResult, StorageError>;
}
