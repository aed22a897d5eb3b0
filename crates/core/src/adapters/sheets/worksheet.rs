use error_stack::ResultExt;
use tracing::instrument;

use crate::domain::sheets::{a1_notation::A1Notation, column::Column, row::Row};
use crate::ports::worksheet::{Worksheet, WorksheetError};

use super::{
    spreadsheet_manager::{SpreadsheetManager, WorksheetProperties},
    spreadsheet_read::SpreadsheetRead,
    spreadsheet_write::SpreadsheetWrite,
};

impl SpreadsheetManager {
    async fn resolved(&self) -> error_stack::Result<WorksheetProperties, WorksheetError> {
        self.worksheet_properties()
            .await
            .change_context(WorksheetError::FailedToResolveWorksheet)
    }
}

/// Ranges left over once `rows` rows of `width` cells are written from A1 on a
/// grid `column_count` columns wide.
fn leftover_ranges(title: &str, rows: usize, width: usize, column_count: usize) -> Vec<A1Notation> {
    let last_column = Column::from_index(column_count.max(width).max(1) - 1);
    if rows == 0 {
        return vec![A1Notation::whole_sheet(title)];
    }

    let mut ranges = vec![A1Notation::rows_from(
        title,
        Row::from_index(rows as u32),
        Column::FIRST,
        last_column,
    )];
    if width < column_count {
        ranges.push(A1Notation::rectangle(
            title,
            Column::from_index(width),
            Row::HEADER,
            last_column,
            Row::from_index(rows as u32 - 1),
        ));
    }
    ranges
}

#[async_trait::async_trait]
impl Worksheet for SpreadsheetManager {
    async fn title(&self) -> error_stack::Result<String, WorksheetError> {
        Ok(self.resolved().await?.title)
    }

    #[instrument(skip(self))]
    async fn read_rows(&self) -> error_stack::Result<Vec<Vec<String>>, WorksheetError> {
        let worksheet = self.resolved().await?;
        self.read_range(&A1Notation::whole_sheet(&worksheet.title))
            .await
            .change_context(WorksheetError::FailedToRead)
    }

    /// The API appends below the block of non-blank rows holding the anchor
    /// cell, so the anchor is `row` itself and never A1.
    #[instrument(skip(self, values))]
    async fn append_row(
        &self,
        row: Row,
        values: Vec<String>,
    ) -> error_stack::Result<(), WorksheetError> {
        let worksheet = self.resolved().await?;
        self.append_rows(
            &A1Notation::cell(&worksheet.title, Column::FIRST, row),
            vec![values],
        )
        .await
        .change_context(WorksheetError::FailedToWrite)
    }

    #[instrument(skip(self, values))]
    async fn write_row(
        &self,
        row: Row,
        values: Vec<String>,
    ) -> error_stack::Result<(), WorksheetError> {
        let worksheet = self.resolved().await?;
        let last_column = Column::from_index(values.len().max(1) - 1);
        self.write_range(
            &A1Notation::row_span(&worksheet.title, row, Column::FIRST, last_column),
            vec![values],
        )
        .await
        .change_context(WorksheetError::FailedToWrite)
    }

    #[instrument(skip(self))]
    async fn delete_row(&self, row: Row) -> error_stack::Result<(), WorksheetError> {
        let worksheet = self.resolved().await?;
        self.delete_rows(worksheet.sheet_id, row, 1)
            .await
            .change_context(WorksheetError::FailedToWrite)
    }

    /// Writes the new content first and clears what is left of the old one
    /// afterwards, so a failure half-way leaves stale rows rather than an
    /// empty sheet.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn overwrite(&self, rows: Vec<Vec<String>>) -> error_stack::Result<(), WorksheetError> {
        let worksheet = self.resolved().await?;
        let row_count = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);

        if row_count > 0 {
            self.write_range(
                &A1Notation::rectangle(
                    &worksheet.title,
                    Column::FIRST,
                    Row::HEADER,
                    Column::from_index(width.max(1) - 1),
                    Row::from_index(row_count as u32 - 1),
                ),
                rows,
            )
            .await
            .change_context(WorksheetError::FailedToWrite)?;
        }

        let column_count = usize::try_from(worksheet.column_count).unwrap_or(0);
        self.clear_ranges(leftover_ranges(
            &worksheet.title,
            row_count,
            width,
            column_count,
        ))
        .await
        .change_context(WorksheetError::FailedToWrite)
        .attach_printable("New rows were written but older rows may remain below them")
    }
}
