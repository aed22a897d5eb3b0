use thiserror::Error;

use crate::domain::attachment::{Attachment, StoredFile};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileStorageError {
    #[error("Failed to upload file")]
    UploadFailed,
    #[error("Failed to delete file")]
    DeleteFailed,
    #[error("Storage returned an invalid link")]
    InvalidLink,
}

#[async_trait::async_trait]
pub trait FileStorage: Send + Sync {
    /// Stores `attachment` and returns where it can be viewed.
    async fn upload(
        &self,
        attachment: &Attachment,
    ) -> error_stack::Result<StoredFile, FileStorageError>;

    async fn delete(&self, file: &StoredFile) -> error_stack::Result<(), FileStorageError>;
}
