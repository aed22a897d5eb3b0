use std::io::Cursor;

use error_stack::{report, ResultExt};
use google_drive3::{
    api::{File, Permission},
    DriveHub,
};
use mime_guess::mime;
use thiserror::Error;
use tracing::instrument;

use crate::adapters::config::{credentials::ServiceAccountCredentials, drive_config::DriveConfig};
use crate::adapters::google::{
    auth,
    http_client::{self, HttpsConnector},
};
use crate::domain::attachment::{Attachment, StoredFile};
use crate::domain::record::validate_link;
use crate::ports::file_storage::{FileStorage, FileStorageError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriveManagerError {
    #[error("Failed to authenticate against the Drive API")]
    FailedToAuthenticate,
}

/// Stores attachments in a single Drive folder.
pub struct DriveManager {
    config: DriveConfig,
    hub: DriveHub<HttpsConnector>,
}

impl std::fmt::Debug for DriveManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DriveManager {{ folder_id: {:?} }}", self.config.folder_id)
    }
}

fn view_link(file_id: &str) -> String {
    format!("https://drive.google.com/file/d/{}/view", file_id)
}

/// The file Drive reported, falling back to the standard view link when it
/// returned none.
fn stored_file(id: String, web_view_link: Option<String>) -> StoredFile {
    let link = web_view_link.unwrap_or_else(|| view_link(&id));
    StoredFile { id, link }
}

fn check_link(file: &StoredFile) -> error_stack::Result<(), FileStorageError> {
    validate_link(&file.link)
        .change_context(FileStorageError::InvalidLink)
        .attach_printable_lazy(|| format!("Link: {}", file.link))
}

impl DriveManager {
    #[instrument(name = "DriveManager::new", skip(credentials))]
    pub async fn new(
        config: DriveConfig,
        credentials: &ServiceAccountCredentials,
    ) -> error_stack::Result<Self, DriveManagerError> {
        let client = http_client::http_client();
        let auth = auth::auth(credentials, client.clone())
            .await
            .change_context(DriveManagerError::FailedToAuthenticate)?;

        Ok(DriveManager {
            config,
            hub: DriveHub::new(client, auth),
        })
    }

    /// Removes a file that was created but cannot be handed out.
    async fn discard(&self, file: &StoredFile) {
        if let Err(delete_error) = self.delete(file).await {
            tracing::error!("Failed to remove file {}: {:?}", file.id, delete_error);
        }
    }

    #[instrument(skip(self))]
    async fn share_with_anyone(&self, file_id: &str) -> error_stack::Result<(), FileStorageError> {
        let permission = Permission {
            role: Some("reader".to_string()),
            type_: Some("anyone".to_string()),
            ..Default::default()
        };

        self.hub
            .permissions()
            .create(permission, file_id)
            .supports_all_drives(true)
            .doit()
            .await
            .map(|_| ())
            .change_context(FileStorageError::UploadFailed)
            .attach_printable_lazy(|| format!("Failed to share file {}", file_id))
    }
}

#[async_trait::async_trait]
impl FileStorage for DriveManager {
    #[instrument(skip(self))]
    async fn upload(
        &self,
        attachment: &Attachment,
    ) -> error_stack::Result<StoredFile, FileStorageError> {
        let mime_type: mime::Mime = attachment
            .mime_type
            .parse()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);

        let metadata = File {
            name: Some(attachment.file_name.clone()),
            mime_type: Some(mime_type.essence_str().to_string()),
            parents: Some(vec![self.config.folder_id.to_string()]),
            ..Default::default()
        };

        let (_, created) = self
            .hub
            .files()
            .create(metadata)
            .supports_all_drives(true)
            .param("fields", "id,webViewLink")
            .upload(Cursor::new(attachment.bytes.clone()), mime_type)
            .await
            .change_context(FileStorageError::UploadFailed)
            .attach_printable_lazy(|| format!("File name: {}", attachment.file_name))?;

        let id = created
            .id
            .ok_or(report!(FileStorageError::UploadFailed))
            .attach_printable("Drive did not return a file id")?;
        let stored = stored_file(id, created.web_view_link);

        let mut published = check_link(&stored);
        if published.is_ok() && self.config.share_with_anyone {
            published = self.share_with_anyone(&stored.id).await;
        }
        if let Err(report) = published {
            self.discard(&stored).await;
            return Err(report);
        }

        tracing::info!(
            "Uploaded {} ({} bytes) as {}",
            attachment.file_name,
            attachment.size(),
            stored.id
        );
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn delete(&self, file: &StoredFile) -> error_stack::Result<(), FileStorageError> {
        self.hub
            .files()
            .delete(&file.id)
            .supports_all_drives(true)
            .doit()
            .await
            .map(|_| ())
            .change_context(FileStorageError::DeleteFailed)
            .attach_printable_lazy(|| format!("File id: {}", file.id))
    }
}
