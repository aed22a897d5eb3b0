use error_stack::ResultExt;
use serde_json::Value;
use tracing::instrument;

use crate::domain::sheets::a1_notation::A1Notation;

use super::spreadsheet_manager::{SpreadsheetManager, SpreadsheetManagerError};

pub trait SpreadsheetRead {
    fn read_range(
        &self,
        range: &A1Notation,
    ) -> impl std::future::Future<
        Output = error_stack::Result<Vec<Vec<String>>, SpreadsheetManagerError>,
    > + Send;
}

/// Text of a cell as the API returned it. Empty cells come back as `""` or
/// are missing altogether.
pub(super) fn cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl SpreadsheetRead for SpreadsheetManager {
    #[instrument]
    async fn read_range(
        &self,
        range: &A1Notation,
    ) -> error_stack::Result<Vec<Vec<String>>, SpreadsheetManagerError> {
        let response = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, range.as_ref())
            .major_dimension("ROWS")
            .doit()
            .await
            .change_context(SpreadsheetManagerError::FailedToFetchRange)
            .attach_printable_lazy(|| format!("Failed to fetch values for range {}", range))?;

        // An empty range comes back without `values`.
        let rows = response
            .1
            .values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect();

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(Value::String("9.0".to_string())), "9.0");
        assert_eq!(cell_to_string(Value::Null), "");
        assert_eq!(cell_to_string(serde_json::json!(8.5)), "8.5");
        assert_eq!(cell_to_string(serde_json::json!(true)), "true");
    }
}
