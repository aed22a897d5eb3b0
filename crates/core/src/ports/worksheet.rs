use thiserror::Error;

use crate::domain::sheets::row::Row;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorksheetError {
    #[error("Failed to resolve worksheet")]
    FailedToResolveWorksheet,
    #[error("Failed to read worksheet")]
    FailedToRead,
    #[error("Failed to write worksheet")]
    FailedToWrite,
}

/// A single worksheet seen as a grid of text cells. Row 1 is the header.
#[async_trait::async_trait]
pub trait Worksheet: Send + Sync {
    /// Human readable name of the worksheet, used in logs and health reports.
    async fn title(&self) -> error_stack::Result<String, WorksheetError>;

    /// Every row of the worksheet, header included. Trailing empty cells may
    /// be missing from a row.
    async fn read_rows(&self) -> error_stack::Result<Vec<Vec<String>>, WorksheetError>;

    /// Adds `values` as a new row at `row`, which lies below every non-empty
    /// row. The grid grows when `row` is past its end.
    async fn append_row(&self, row: Row, values: Vec<String>)
        -> error_stack::Result<(), WorksheetError>;

    /// Replaces the cells of `row`, starting at the first column.
    async fn write_row(&self, row: Row, values: Vec<String>)
        -> error_stack::Result<(), WorksheetError>;

    /// Removes `row`; the rows below move up by one.
    async fn delete_row(&self, row: Row) -> error_stack::Result<(), WorksheetError>;

    /// Replaces the whole worksheet content with `rows`. Not atomic.
    async fn overwrite(&self, rows: Vec<Vec<String>>) -> error_stack::Result<(), WorksheetError>;
}
