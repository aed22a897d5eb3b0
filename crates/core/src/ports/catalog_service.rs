use thiserror::Error;

use crate::domain::{
    attachment::Attachment,
    record::{Record, RecordDraft, RecordId, RecordPatch},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid record")]
    Validation,
    #[error("Record {0} not found")]
    NotFound(RecordId),
    #[error("Failed to read the catalogue")]
    ReadFailed,
    #[error("Failed to write the catalogue")]
    WriteFailed,
    #[error("Uploads are not configured")]
    UploadDisabled,
    #[error("Failed to upload attachment")]
    UploadFailed,
    #[error("Failed to remove an uploaded file after a failed write")]
    CleanupFailed,
}

/// Outcome of adding a record.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedRecord {
    pub record: Record,
    /// Set when an attachment was given but not uploaded because the rating is
    /// below the upload threshold.
    pub skipped_upload: bool,
}

#[async_trait::async_trait]
pub trait CatalogService: Send + Sync {
    async fn add_record(
        &self,
        draft: RecordDraft,
        attachment: Option<Attachment>,
    ) -> error_stack::Result<AddedRecord, CatalogError>;

    async fn list_records(&self) -> error_stack::Result<Vec<Record>, CatalogError>;

    async fn search_records(&self, query: &str)
        -> error_stack::Result<Vec<Record>, CatalogError>;

    async fn update_record(
        &self,
        id: RecordId,
        patch: RecordPatch,
    ) -> error_stack::Result<Record, CatalogError>;

    async fn delete_record(&self, id: RecordId) -> error_stack::Result<Record, CatalogError>;

    /// Overwrites the whole catalogue with `records`.
    async fn replace_all(&self, records: Vec<Record>) -> error_stack::Result<(), CatalogError>;

    /// Gives an id to every record that lacks one. Returns how many changed.
    async fn assign_missing_ids(&self) -> error_stack::Result<usize, CatalogError>;

    async fn health_check(&self) -> error_stack::Result<String, CatalogError>;
}
