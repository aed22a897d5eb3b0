use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use error_stack::report;

use crate::domain::attachment::{Attachment, StoredFile};
use crate::ports::file_storage::{FileStorage, FileStorageError};

/// File storage kept in memory; links point at a reserved host.
#[derive(Debug, Default)]
pub struct MemoryFileStorage {
    files: Mutex<Vec<(StoredFile, Attachment)>>,
    deleted: Mutex<Vec<StoredFile>>,
    upload_attempts: Mutex<usize>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> Vec<StoredFile> {
        lock(&self.files).iter().map(|(file, _)| file.clone()).collect()
    }

    pub fn deleted(&self) -> Vec<StoredFile> {
        lock(&self.deleted).clone()
    }

    pub fn upload_attempts(&self) -> usize {
        *lock(&self.upload_attempts)
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait::async_trait]
impl FileStorage for MemoryFileStorage {
    async fn upload(
        &self,
        attachment: &Attachment,
    ) -> error_stack::Result<StoredFile, FileStorageError> {
        let attempt = {
            let mut attempts = lock(&self.upload_attempts);
            *attempts += 1;
            *attempts
        };
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(report!(FileStorageError::UploadFailed));
        }

        let id = format!("file-{}", attempt);
        let stored = StoredFile {
            link: format!("https://storage.invalid/files/{}/view", id),
            id,
        };
        lock(&self.files).push((stored.clone(), attachment.clone()));
        Ok(stored)
    }

    async fn delete(&self, file: &StoredFile) -> error_stack::Result<(), FileStorageError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(report!(FileStorageError::DeleteFailed));
        }
        lock(&self.files).retain(|(stored, _)| stored.id != file.id);
        lock(&self.deleted).push(file.clone());
        Ok(())
    }
}
