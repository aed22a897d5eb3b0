use thiserror::Error;

use crate::domain::record::{Record, RecordId, RecordPatch};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordRepositoryError {
    #[error("Failed to read records")]
    ReadError,
    #[error("Failed to write records")]
    WriteError,
    #[error("Record {0} not found")]
    NotFound(RecordId),
    #[error("Record is invalid")]
    InvalidRecord,
}

#[async_trait::async_trait]
pub trait RecordRepository: Send + Sync {
    /// Where the records live, for health reports.
    async fn location(&self) -> error_stack::Result<String, RecordRepositoryError>;

    /// Every stored record, in insertion order.
    async fn list(&self) -> error_stack::Result<Vec<Record>, RecordRepositoryError>;

    async fn append(&self, record: &Record) -> error_stack::Result<(), RecordRepositoryError>;

    /// Applies `patch` to the record with `id` and stores only that record.
    async fn update(
        &self,
        id: RecordId,
        patch: &RecordPatch,
    ) -> error_stack::Result<Record, RecordRepositoryError>;

    /// Removes the record with `id` and returns it.
    async fn delete(&self, id: RecordId) -> error_stack::Result<Record, RecordRepositoryError>;

    /// Replaces every stored record with `records`, in order.
    async fn replace_all(&self, records: &[Record])
        -> error_stack::Result<(), RecordRepositoryError>;

    /// Gives a fresh id to every stored record lacking one, leaving every other
    /// cell as it is. Returns how many records changed.
    async fn assign_missing_ids(&self) -> error_stack::Result<usize, RecordRepositoryError>;
}
