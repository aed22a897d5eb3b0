use std::fmt::Formatter;

use super::{column::Column, row::Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(String);

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<A1Notation> for String {
    fn from(a1_notation: A1Notation) -> Self {
        a1_notation.0
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn quote_sheet_title(sheet_title: &str) -> String {
    format!("'{}'", sheet_title.replace('\'', "''"))
}

impl A1Notation {
    /// Every cell of the sheet.
    pub fn whole_sheet(sheet_title: &str) -> Self {
        A1Notation(quote_sheet_title(sheet_title))
    }

    pub fn cell(sheet_title: &str, column: Column, row: Row) -> Self {
        A1Notation(format!("{}!{}{}", quote_sheet_title(sheet_title), column, row))
    }

    /// A rectangle spanning `first_row..=last_row` and `first_column..=last_column`.
    pub fn rectangle(
        sheet_title: &str,
        first_column: Column,
        first_row: Row,
        last_column: Column,
        last_row: Row,
    ) -> Self {
        A1Notation(format!(
            "{}!{}{}:{}{}",
            quote_sheet_title(sheet_title),
            first_column,
            first_row,
            last_column,
            last_row
        ))
    }

    /// Cells of a single row between two columns.
    pub fn row_span(sheet_title: &str, row: Row, first_column: Column, last_column: Column) -> Self {
        Self::rectangle(sheet_title, first_column, row, last_column, row)
    }

    /// From `first_row` down to the end of the sheet, between two columns.
    pub fn rows_from(
        sheet_title: &str,
        first_row: Row,
        first_column: Column,
        last_column: Column,
    ) -> Self {
        A1Notation(format!(
            "{}!{}{}:{}",
            quote_sheet_title(sheet_title),
            first_column,
            first_row,
            last_column
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_sheet_quotes_title() {
        assert_eq!(A1Notation::whole_sheet("Sheet1").as_ref(), "'Sheet1'");
        assert_eq!(
            A1Notation::whole_sheet("Bob's list").as_ref(),
            "'Bob''s list'"
        );
    }

    #[test]
    fn test_cell() {
        assert_eq!(
            A1Notation::cell("Sheet1", Column::FIRST, Row::HEADER).as_ref(),
            "'Sheet1'!A1"
        );
    }

    #[test]
    fn test_row_span() {
        let a1 = A1Notation::row_span(
            "Sheet1",
            Row::for_record(2),
            Column::FIRST,
            Column::from_index(7),
        );
        assert_eq!(a1.to_string(), "'Sheet1'!A4:H4");
    }

    #[test]
    fn test_rows_from_is_open_ended() {
        let a1 = A1Notation::rows_from(
            "Catalogue",
            Row::from_index(9),
            Column::FIRST,
            Column::from_index(25),
        );
        assert_eq!(String::from(a1), "'Catalogue'!A10:Z");
    }

    #[test]
    fn test_rectangle() {
        let a1 = A1Notation::rectangle(
            "Sheet1",
            Column::from_index(8),
            Row::HEADER,
            Column::from_index(25),
            Row::from_index(2),
        );
        assert_eq!(a1.as_ref(), "'Sheet1'!I1:Z3");
    }
}
