use std::path::Path;

use error_stack::{report, ResultExt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("Attachment path has no file name")]
    NoFileName,
    #[error("Failed to read attachment")]
    Unreadable,
}

/// A local file the user asked to upload alongside a record.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Attachment {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> error_stack::Result<Self, AttachmentError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(report!(AttachmentError::NoFileName))
            .attach_printable_lazy(|| format!("Path: {}", path.display()))?;

        let bytes = tokio::fs::read(path)
            .await
            .change_context(AttachmentError::Unreadable)
            .attach_printable_lazy(|| format!("Path: {}", path.display()))?;

        Ok(Attachment::new(file_name, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A file kept by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
    pub link: String,
}
