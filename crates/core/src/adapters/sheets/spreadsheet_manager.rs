use error_stack::{report, ResultExt};
use google_sheets4::Sheets;
use std::fmt::Debug;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::adapters::config::credentials::ServiceAccountCredentials;
use crate::adapters::google::{
    auth,
    http_client::{self, HttpsConnector},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetManagerError {
    #[error("Failed to authenticate against the Sheets API")]
    FailedToAuthenticate,
    #[error("Failed to fetch worksheet: {0}")]
    FailedToFetchWorksheet(&'static str),
    #[error("Failed to fetch range")]
    FailedToFetchRange,
    #[error("Failed to write range")]
    FailedToWriteRange,
    #[error("Failed to clear ranges")]
    FailedToClearRanges,
    #[error("Failed to delete rows")]
    FailedToDeleteRows,
}

/// Properties of the worksheet records are kept in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetProperties {
    pub sheet_id: i32,
    pub title: String,
    pub column_count: i32,
}

pub struct SpreadsheetManager {
    pub(super) spreadsheet_id: String,
    worksheet_title: Option<String>,
    pub(super) hub: Sheets<HttpsConnector>,
    worksheet_cache: RwLock<Option<WorksheetProperties>>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SpreadsheetManager {{ spreadsheet_id: {:?}, worksheet: {:?} }}",
            self.spreadsheet_id, self.worksheet_title
        )
    }
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new", skip(credentials))]
    pub async fn new(
        spreadsheet_id: String,
        worksheet_title: Option<String>,
        credentials: &ServiceAccountCredentials,
    ) -> error_stack::Result<Self, SpreadsheetManagerError> {
        let client = http_client::http_client();
        let auth = auth::auth(credentials, client.clone())
            .await
            .change_context(SpreadsheetManagerError::FailedToAuthenticate)?;
        let hub = Sheets::new(client, auth);

        Ok(SpreadsheetManager {
            spreadsheet_id,
            worksheet_title,
            hub,
            worksheet_cache: RwLock::new(None),
        })
    }

    #[instrument]
    async fn fetch_worksheet_properties(
        &self,
    ) -> error_stack::Result<WorksheetProperties, SpreadsheetManagerError> {
        let response = self
            .hub
            .spreadsheets()
            .get(&self.spreadsheet_id)
            .param("fields", "sheets.properties")
            .doit()
            .await
            .change_context(SpreadsheetManagerError::FailedToFetchWorksheet(
                "Failed to fetch spreadsheet",
            ))
            .attach_printable_lazy(|| format!("Spreadsheet id: {}", self.spreadsheet_id))?;

        let sheets = response.1.sheets.ok_or(report!(
            SpreadsheetManagerError::FailedToFetchWorksheet(
                "Sheets not present in spreadsheet response"
            )
        ))?;

        let properties = sheets
            .into_iter()
            .filter_map(|sheet| sheet.properties)
            .find(|properties| match &self.worksheet_title {
                Some(wanted) => properties.title.as_deref() == Some(wanted.as_str()),
                None => true,
            })
            .ok_or(report!(SpreadsheetManagerError::FailedToFetchWorksheet(
                "Worksheet not found"
            )))
            .attach_printable_lazy(|| {
                format!(
                    "Worksheet {:?} not found in spreadsheet {}",
                    self.worksheet_title, self.spreadsheet_id
                )
            })?;

        Ok(WorksheetProperties {
            sheet_id: properties.sheet_id.unwrap_or(0),
            title: properties.title.ok_or(report!(
                SpreadsheetManagerError::FailedToFetchWorksheet("Worksheet has no title")
            ))?,
            column_count: properties
                .grid_properties
                .and_then(|grid| grid.column_count)
                .unwrap_or(26),
        })
    }

    #[instrument]
    pub async fn worksheet_properties(
        &self,
    ) -> error_stack::Result<WorksheetProperties, SpreadsheetManagerError> {
        let cache = {
            // -- MUTEX READ --
            let guard = self.worksheet_cache.read().await;
            guard.clone()
            // -- END MUTEX READ --
        };

        match cache {
            Some(properties) => Ok(properties),
            None => {
                let fetched = self.fetch_worksheet_properties().await?;
                tracing::debug!(
                    "Resolved worksheet '{}' (sheet id {})",
                    fetched.title,
                    fetched.sheet_id
                );
                {
                    // -- MUTEX WRITE --
                    let mut guard = self.worksheet_cache.write().await;
                    guard.replace(fetched.clone());
                    // -- END MUTEX WRITE --
                }
                Ok(fetched)
            }
        }
    }
}
