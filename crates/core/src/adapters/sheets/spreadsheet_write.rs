use error_stack::ResultExt;
use google_sheets4::api::{
    BatchClearValuesRequest, BatchUpdateSpreadsheetRequest, DeleteDimensionRequest,
    DimensionRange, Request, ValueRange,
};
use tracing::instrument;

use crate::domain::sheets::{a1_notation::A1Notation, row::Row};

use super::{
    spreadsheet_manager::{SpreadsheetManager, SpreadsheetManagerError},
    value_range_factory::ValueRangeFactory,
};

/// Values are written as-is: nothing typed by the user is parsed as a formula.
const VALUE_INPUT_OPTION: &str = "RAW";

pub trait SpreadsheetWrite {
    fn write_range(
        &self,
        range: &A1Notation,
        rows: Vec<Vec<String>>,
    ) -> impl std::future::Future<Output = error_stack::Result<(), SpreadsheetManagerError>> + Send;

    fn append_rows(
        &self,
        range: &A1Notation,
        rows: Vec<Vec<String>>,
    ) -> impl std::future::Future<Output = error_stack::Result<(), SpreadsheetManagerError>> + Send;

    fn clear_ranges(
        &self,
        ranges: Vec<A1Notation>,
    ) -> impl std::future::Future<Output = error_stack::Result<(), SpreadsheetManagerError>> + Send;

    fn delete_rows(
        &self,
        sheet_id: i32,
        first: Row,
        count: u32,
    ) -> impl std::future::Future<Output = error_stack::Result<(), SpreadsheetManagerError>> + Send;
}

impl SpreadsheetWrite for SpreadsheetManager {
    #[instrument(skip(rows), fields(rows = rows.len()))]
    async fn write_range(
        &self,
        range: &A1Notation,
        rows: Vec<Vec<String>>,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        self.hub
            .spreadsheets()
            .values_update(ValueRange::from_rows(rows), &self.spreadsheet_id, range.as_ref())
            .value_input_option(VALUE_INPUT_OPTION)
            .doit()
            .await
            .map(|_| ())
            .change_context(SpreadsheetManagerError::FailedToWriteRange)
            .attach_printable_lazy(|| format!("Failed to write to range {}", range))
    }

    #[instrument(skip(rows), fields(rows = rows.len()))]
    async fn append_rows(
        &self,
        range: &A1Notation,
        rows: Vec<Vec<String>>,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        self.hub
            .spreadsheets()
            .values_append(ValueRange::from_rows(rows), &self.spreadsheet_id, range.as_ref())
            .value_input_option(VALUE_INPUT_OPTION)
            .insert_data_option("INSERT_ROWS")
            .doit()
            .await
            .map(|_| ())
            .change_context(SpreadsheetManagerError::FailedToWriteRange)
            .attach_printable_lazy(|| format!("Failed to append to range {}", range))
    }

    #[instrument]
    async fn clear_ranges(
        &self,
        ranges: Vec<A1Notation>,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let printable = ranges
            .iter()
            .map(|range| range.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let request = BatchClearValuesRequest {
            ranges: Some(ranges.into_iter().map(String::from).collect()),
        };

        self.hub
            .spreadsheets()
            .values_batch_clear(request, &self.spreadsheet_id)
            .doit()
            .await
            .map(|_| ())
            .change_context(SpreadsheetManagerError::FailedToClearRanges)
            .attach_printable_lazy(|| format!("Failed to clear ranges {}", printable))
    }

    #[instrument]
    async fn delete_rows(
        &self,
        sheet_id: i32,
        first: Row,
        count: u32,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        let start = first.index() as i32;
        let request = BatchUpdateSpreadsheetRequest {
            requests: Some(vec![Request {
                delete_dimension: Some(DeleteDimensionRequest {
                    range: Some(DimensionRange {
                        dimension: Some("ROWS".to_string()),
                        sheet_id: Some(sheet_id),
                        start_index: Some(start),
                        end_index: Some(start + count as i32),
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            ..Default::default()
        };

        self.hub
            .spreadsheets()
            .batch_update(request, &self.spreadsheet_id)
            .doit()
            .await
            .map(|_| ())
            .change_context(SpreadsheetManagerError::FailedToDeleteRows)
            .attach_printable_lazy(|| format!("Failed to delete {} row(s) from row {}", count, first))
    }
}
