use std::sync::Arc;

use catalog_core::{
    adapters::{
        config::app_config::AppConfig, drive::drive_manager::DriveManager,
        repository::worksheet_record_repository::WorksheetRecordRepository,
        sheets::spreadsheet_manager::SpreadsheetManager,
    },
    application::service::{CatalogApplicationService, UploadPolicy},
    ports::{catalog_service::CatalogService, file_storage::FileStorage},
};
use error_stack::ResultExt;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Invalid configuration")]
    Config,
    #[error("Failed to load service account credentials")]
    Credentials,
    #[error("Failed to connect to the spreadsheet")]
    Spreadsheet,
    #[error("Failed to connect to the drive folder")]
    Drive,
}

pub struct ApplicationServiceFactory;

impl ApplicationServiceFactory {
    #[instrument(skip(config))]
    pub async fn create(
        config: &AppConfig,
    ) -> error_stack::Result<Arc<dyn CatalogService>, FactoryError> {
        let credentials = config
            .credentials
            .resolve()
            .change_context(FactoryError::Credentials)?;
        tracing::debug!("Using service account {}", credentials.client_email());

        let spreadsheet_id = config
            .sheets
            .spreadsheet_id()
            .change_context(FactoryError::Config)?;

        let spreadsheet_manager = SpreadsheetManager::new(
            spreadsheet_id,
            config.sheets.worksheet.as_deref().map(String::from),
            &credentials,
        )
        .await
        .change_context(FactoryError::Spreadsheet)?;

        let storage: Option<Arc<dyn FileStorage>> = match &config.drive {
            Some(drive) => Some(Arc::new(
                DriveManager::new(drive.clone(), &credentials)
                    .await
                    .change_context(FactoryError::Drive)?,
            )),
            None => None,
        };

        let service = CatalogApplicationService::new(
            Arc::new(WorksheetRecordRepository::new(Arc::new(spreadsheet_manager))),
            storage,
            UploadPolicy::new(config.upload.min_rating),
        );
        Ok(Arc::new(service))
    }
}
