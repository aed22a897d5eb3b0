use std::collections::HashSet;
use std::sync::Arc;

use error_stack::{report, Report, ResultExt};
use tracing::{error, info, instrument, warn};

use crate::domain::attachment::{Attachment, StoredFile};
use crate::domain::record::{timestamp_now, Rating, Record, RecordDraft, RecordId, RecordPatch};
use crate::domain::search;
use crate::ports::catalog_service::{AddedRecord, CatalogError, CatalogService};
use crate::ports::file_storage::FileStorage;
use crate::ports::record_repository::{RecordRepository, RecordRepositoryError};

/// Decides which attachments are worth uploading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadPolicy {
    pub min_rating: f64,
}

impl UploadPolicy {
    pub fn new(min_rating: f64) -> Self {
        Self { min_rating }
    }

    pub fn allows(&self, rating: Rating) -> bool {
        rating.value() >= self.min_rating
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self { min_rating: 8.0 }
    }
}

pub struct CatalogApplicationService {
    repository: Arc<dyn RecordRepository>,
    storage: Option<Arc<dyn FileStorage>>,
    upload_policy: UploadPolicy,
}

impl std::fmt::Debug for CatalogApplicationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogApplicationService")
            .field("uploads_enabled", &self.storage.is_some())
            .field("upload_policy", &self.upload_policy)
            .finish()
    }
}

impl CatalogApplicationService {
    pub fn new(
        repository: Arc<dyn RecordRepository>,
        storage: Option<Arc<dyn FileStorage>>,
        upload_policy: UploadPolicy,
    ) -> Self {
        Self {
            repository,
            storage,
            upload_policy,
        }
    }

    /// Removes a file whose record could not be stored. When that fails too the
    /// returned report leads with the cleanup failure and names the orphan.
    async fn compensate(
        &self,
        storage: &dyn FileStorage,
        file: &StoredFile,
        write_error: Report<CatalogError>,
    ) -> Report<CatalogError> {
        match storage.delete(file).await {
            Ok(()) => {
                warn!("Removed uploaded file {} after the record failed to save", file.id);
                write_error
            }
            Err(cleanup_error) => {
                error!("Uploaded file {} is orphaned", file.id);
                let mut report = cleanup_error
                    .change_context(CatalogError::CleanupFailed)
                    .attach_printable(format!("Orphaned file id: {}", file.id))
                    .attach_printable(format!("Orphaned file link: {}", file.link));
                report.extend_one(write_error);
                report
            }
        }
    }
}

fn from_repository(report: Report<RecordRepositoryError>) -> Report<CatalogError> {
    let context = match report.current_context() {
        RecordRepositoryError::ReadError => CatalogError::ReadFailed,
        RecordRepositoryError::WriteError => CatalogError::WriteFailed,
        RecordRepositoryError::NotFound(id) => CatalogError::NotFound(*id),
        RecordRepositoryError::InvalidRecord => CatalogError::Validation,
    };
    report.change_context(context)
}

fn validate_batch(records: &[Record]) -> error_stack::Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for (position, record) in records.iter().enumerate() {
        record
            .validate()
            .change_context(CatalogError::Validation)
            .attach_printable_lazy(|| format!("Record #{} ({:?})", position + 1, record.title))?;

        if let Some(id) = record.id {
            if !seen.insert(id) {
                return Err(report!(CatalogError::Validation))
                    .attach_printable(format!("Duplicate record id {}", id));
            }
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl CatalogService for CatalogApplicationService {
    #[instrument(skip(self, draft), fields(title = %draft.title, rating = %draft.rating))]
    async fn add_record(
        &self,
        draft: RecordDraft,
        attachment: Option<Attachment>,
    ) -> error_stack::Result<AddedRecord, CatalogError> {
        draft.validate().change_context(CatalogError::Validation)?;

        let mut skipped_upload = false;
        let upload = match attachment {
            None => None,
            Some(attachment) => {
                let storage = self
                    .storage
                    .as_deref()
                    .ok_or(report!(CatalogError::UploadDisabled))
                    .attach_printable("No drive folder is configured")?;

                if self.upload_policy.allows(draft.rating) {
                    Some((storage, attachment))
                } else {
                    info!(
                        "Rating {} is below {:.1}, not uploading {}",
                        draft.rating, self.upload_policy.min_rating, attachment.file_name
                    );
                    skipped_upload = true;
                    None
                }
            }
        };

        let stored = match upload {
            Some((storage, attachment)) => Some((
                storage,
                storage
                    .upload(&attachment)
                    .await
                    .change_context(CatalogError::UploadFailed)?,
            )),
            None => None,
        };

        let record = draft.into_record(
            timestamp_now(),
            stored.as_ref().map(|(_, file)| file.link.clone()),
        );

        if let Err(write_error) = self.repository.append(&record).await {
            let write_error = from_repository(write_error);
            return Err(match &stored {
                Some((storage, file)) => self.compensate(*storage, file, write_error).await,
                None => write_error,
            });
        }

        info!("Added record {:?}", record.title);
        Ok(AddedRecord {
            record,
            skipped_upload,
        })
    }

    #[instrument(skip(self))]
    async fn list_records(&self) -> error_stack::Result<Vec<Record>, CatalogError> {
        self.repository.list().await.map_err(from_repository)
    }

    #[instrument(skip(self))]
    async fn search_records(
        &self,
        query: &str,
    ) -> error_stack::Result<Vec<Record>, CatalogError> {
        let records = self.list_records().await?;
        Ok(search::filter(records, query))
    }

    #[instrument(skip(self))]
    async fn update_record(
        &self,
        id: RecordId,
        patch: RecordPatch,
    ) -> error_stack::Result<Record, CatalogError> {
        if patch.is_empty() {
            return Err(report!(CatalogError::Validation)).attach_printable("Nothing to update");
        }
        patch.validate().change_context(CatalogError::Validation)?;

        self.repository
            .update(id, &patch)
            .await
            .map_err(from_repository)
    }

    #[instrument(skip(self))]
    async fn delete_record(&self, id: RecordId) -> error_stack::Result<Record, CatalogError> {
        let record = self.repository.delete(id).await.map_err(from_repository)?;
        if let Some(link) = &record.file_link {
            info!("Deleted record {} kept its uploaded file {}", id, link);
        }
        Ok(record)
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn replace_all(&self, records: Vec<Record>) -> error_stack::Result<(), CatalogError> {
        validate_batch(&records)?;
        self.repository
            .replace_all(&records)
            .await
            .map_err(from_repository)
    }

    #[instrument(skip(self))]
    async fn assign_missing_ids(&self) -> error_stack::Result<usize, CatalogError> {
        let assigned = self
            .repository
            .assign_missing_ids()
            .await
            .map_err(from_repository)?;

        if assigned == 0 {
            info!("Every record already has an id");
        } else {
            info!("Assigned ids to {} records", assigned);
        }
        Ok(assigned)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> error_stack::Result<String, CatalogError> {
        let location = self
            .repository
            .location()
            .await
            .map_err(from_repository)?;
        let records = self.list_records().await?;

        let uploads = match self.storage {
            Some(_) => format!("enabled (min rating {:.1})", self.upload_policy.min_rating),
            None => "disabled".to_string(),
        };

        Ok(format!(
            "OK: {}, {} records, uploads {}",
            location,
            records.len(),
            uploads
        ))
    }
}
