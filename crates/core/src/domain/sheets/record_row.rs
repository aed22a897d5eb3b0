use std::collections::HashMap;

use error_stack::{report, ResultExt};
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

use crate::domain::record::{validate_link, Category, Rating, Record, RecordId};

use super::row::Row;

/// Columns a record is spread over, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum RecordColumn {
    Id,
    Title,
    Category,
    Tags,
    Rating,
    Review,
    CreatedAt,
    FileLink,
}

impl RecordColumn {
    pub fn name(&self) -> &'static str {
        match self {
            RecordColumn::Id => "id",
            RecordColumn::Title => "title",
            RecordColumn::Category => "category",
            RecordColumn::Tags => "tags",
            RecordColumn::Rating => "rating",
            RecordColumn::Review => "review",
            RecordColumn::CreatedAt => "created_at",
            RecordColumn::FileLink => "file_link",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            RecordColumn::Title | RecordColumn::Category | RecordColumn::Rating
        )
    }

    fn from_header_cell(cell: &str) -> Option<Self> {
        let normalized = cell.trim().to_lowercase().replace(' ', "_");
        RecordColumn::iter().find(|column| column.name() == normalized)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowDecodeError {
    #[error("Required column '{0}' is missing from the header row")]
    MissingColumn(&'static str),
    #[error("Invalid value in row {row}, column '{column}'")]
    InvalidCell { row: Row, column: &'static str },
}

/// The header row of the worksheet: maps record columns to cell positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    cells: Vec<String>,
    positions: HashMap<RecordColumn, usize>,
}

impl Header {
    pub fn canonical() -> Self {
        Header::parse(RecordColumn::iter().map(|c| c.name().to_string()).collect())
    }

    pub fn parse(cells: Vec<String>) -> Self {
        let mut positions = HashMap::new();
        for (position, cell) in cells.iter().enumerate() {
            if let Some(column) = RecordColumn::from_header_cell(cell) {
                positions.entry(column).or_insert(position);
            }
        }
        Header { cells, positions }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn width(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.trim().is_empty())
    }

    pub fn position(&self, column: RecordColumn) -> Option<usize> {
        self.positions.get(&column).copied()
    }

    pub fn missing_columns(&self) -> Vec<RecordColumn> {
        RecordColumn::iter()
            .filter(|column| !self.positions.contains_key(column))
            .collect()
    }

    /// The header with every missing record column appended after the existing
    /// cells, or `None` when nothing is missing.
    pub fn extended(&self) -> Option<Header> {
        if self.is_empty() {
            return Some(Header::canonical());
        }
        let missing = self.missing_columns();
        if missing.is_empty() {
            return None;
        }
        let mut cells = self.cells.clone();
        cells.extend(missing.iter().map(|column| column.name().to_string()));
        Some(Header::parse(cells))
    }

    pub fn ensure_decodable(&self) -> error_stack::Result<(), RowDecodeError> {
        match RecordColumn::iter()
            .filter(RecordColumn::is_required)
            .find(|column| self.position(*column).is_none())
        {
            Some(column) => Err(report!(RowDecodeError::MissingColumn(column.name())))
                .attach_printable_lazy(|| format!("Header row: {:?}", self.cells)),
            None => Ok(()),
        }
    }

    fn cell<'a>(&self, cells: &'a [String], column: RecordColumn) -> &'a str {
        self.position(column)
            .and_then(|position| cells.get(position))
            .map(|cell| cell.trim())
            .unwrap_or_default()
    }

    /// Decodes one data row. Blank rows decode to `None`.
    pub fn decode(
        &self,
        row: Row,
        cells: &[String],
    ) -> error_stack::Result<Option<Record>, RowDecodeError> {
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            return Ok(None);
        }
        self.ensure_decodable()?;

        let invalid = |column: RecordColumn| RowDecodeError::InvalidCell {
            row,
            column: column.name(),
        };

        let id = match self.cell(cells, RecordColumn::Id) {
            "" => None,
            id => Some(id.parse::<RecordId>().change_context(invalid(RecordColumn::Id))?),
        };

        let title = self.cell(cells, RecordColumn::Title);
        if title.is_empty() {
            return Err(report!(invalid(RecordColumn::Title)))
                .attach_printable("Title must not be empty");
        }

        let category = self
            .cell(cells, RecordColumn::Category)
            .parse::<Category>()
            .change_context(invalid(RecordColumn::Category))?;

        let rating = self
            .cell(cells, RecordColumn::Rating)
            .parse::<Rating>()
            .change_context(invalid(RecordColumn::Rating))?;

        let file_link = match self.cell(cells, RecordColumn::FileLink) {
            "" => None,
            link => {
                validate_link(link).change_context(invalid(RecordColumn::FileLink))?;
                Some(link.to_string())
            }
        };

        Ok(Some(Record {
            id,
            title: title.to_string(),
            category,
            tags: self.cell(cells, RecordColumn::Tags).to_string(),
            rating,
            review: self
                .position(RecordColumn::Review)
                .and_then(|position| cells.get(position))
                .cloned()
                .unwrap_or_default(),
            created_at: self.cell(cells, RecordColumn::CreatedAt).to_string(),
            file_link,
        }))
    }

    /// Lays `record` out in this header's column order. Cells of `previous`
    /// under columns the record does not own are kept as they were.
    pub fn encode(&self, record: &Record, previous: Option<&[String]>) -> Vec<String> {
        let mut cells = previous.map(<[String]>::to_vec).unwrap_or_default();
        cells.resize(self.width(), String::new());

        for column in RecordColumn::iter() {
            if let Some(position) = self.position(column) {
                if !same_value(&cells[position], record, column) {
                    cells[position] = encode_cell(record, column);
                }
            }
        }
        cells
    }
}

/// Whether `cell` already spells the record's value, possibly in a legacy
/// form such as `小说` or `8`.
fn same_value(cell: &str, record: &Record, column: RecordColumn) -> bool {
    match column {
        RecordColumn::Category => cell.trim().parse::<Category>().ok() == Some(record.category),
        RecordColumn::Rating => cell.trim().parse::<Rating>().ok() == Some(record.rating),
        _ => false,
    }
}

fn encode_cell(record: &Record, column: RecordColumn) -> String {
    match column {
        RecordColumn::Id => record.id.map(|id| id.to_string()).unwrap_or_default(),
        RecordColumn::Title => record.title.clone(),
        RecordColumn::Category => record.category.label().to_string(),
        RecordColumn::Tags => record.tags.clone(),
        RecordColumn::Rating => record.rating.to_string(),
        RecordColumn::Review => record.review.clone(),
        RecordColumn::CreatedAt => record.created_at.clone(),
        RecordColumn::FileLink => record.file_link.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::RecordDraft;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn sample() -> Record {
        RecordDraft::new("X", Category::Av, Rating::new(9.0).unwrap())
            .with_tags("tag1 tag2")
            .with_review("fine")
            .into_record("2024-05-01 12:00:00.000000".to_string(), None)
    }

    #[test]
    fn test_canonical_header_order() {
        assert_eq!(
            Header::canonical().cells(),
            strings(&[
                "id",
                "title",
                "category",
                "tags",
                "rating",
                "review",
                "created_at",
                "file_link"
            ])
            .as_slice()
        );
    }

    #[test]
    fn test_header_matching_is_case_insensitive() {
        let header = Header::parse(strings(&[" Title", "CATEGORY", "Rating", "Created At"]));
        assert_eq!(header.position(RecordColumn::Title), Some(0));
        assert_eq!(header.position(RecordColumn::CreatedAt), Some(3));
        assert_eq!(header.position(RecordColumn::FileLink), None);
    }

    #[test]
    fn test_encode_then_decode_with_canonical_header() {
        let header = Header::canonical();
        let record = sample();
        let cells = header.encode(&record, None);
        assert_eq!(cells[4], "9.0");
        let decoded = header.decode(Row::for_record(0), &cells).unwrap();
        assert_eq!(decoded, Some(record));
    }

    #[test]
    fn test_decode_tolerates_missing_optional_columns() {
        let header = Header::parse(strings(&["title", "category", "tags", "rating", "review", "created_at"]));
        let cells = strings(&["Dune", "小说", "scifi", "9", "", "2023-01-01 00:00:00"]);
        let record = header
            .decode(Row::for_record(0), &cells)
            .unwrap()
            .unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.file_link, None);
        assert_eq!(record.category, Category::Novel);
        assert_eq!(record.rating.value(), 9.0);
    }

    #[test]
    fn test_decode_short_row_reads_missing_cells_as_empty() {
        let header = Header::canonical();
        let id = sample().id.unwrap().to_string();
        let cells = strings(&[&id, "Dune", "Novel", "", "8.5"]);
        let record = header.decode(Row::for_record(0), &cells).unwrap().unwrap();
        assert_eq!(record.review, "");
        assert_eq!(record.created_at, "");
    }

    #[test]
    fn test_decode_blank_row_is_skipped() {
        let header = Header::canonical();
        assert_eq!(
            header.decode(Row::for_record(0), &strings(&["", " "])).unwrap(),
            None
        );
    }

    #[test]
    fn test_decode_reports_row_and_column() {
        let header = Header::canonical();
        let cells = strings(&["", "Dune", "Novel", "", "eleven"]);
        let report = header.decode(Row::for_record(1), &cells).unwrap_err();
        assert_eq!(
            report.current_context(),
            &RowDecodeError::InvalidCell {
                row: Row::from_index(2),
                column: "rating"
            }
        );
    }

    #[test]
    fn test_decode_requires_title_column() {
        let header = Header::parse(strings(&["category", "rating"]));
        let report = header
            .decode(Row::for_record(0), &strings(&["AV", "5"]))
            .unwrap_err();
        assert_eq!(
            report.current_context(),
            &RowDecodeError::MissingColumn("title")
        );
    }

    #[test]
    fn test_encode_follows_live_column_order_and_keeps_unknown_cells() {
        let header = Header::parse(strings(&["rating", "notes", "title", "category"]));
        let previous = strings(&["1.0", "keep me", "Old", "AV"]);
        let cells = header.encode(&sample(), Some(&previous));
        assert_eq!(cells, strings(&["9.0", "keep me", "X", "AV"]));
    }

    #[test]
    fn test_encode_keeps_legacy_spelling_of_unchanged_values() {
        let header = Header::parse(strings(&["title", "category", "rating"]));
        let previous = strings(&["Old", "小说", "8"]);
        let mut record = RecordDraft::new("Old", Category::Novel, Rating::new(8.0).unwrap())
            .into_record(String::new(), None);

        assert_eq!(header.encode(&record, Some(&previous)), previous);

        record.category = Category::Anime;
        record.rating = Rating::new(7.5).unwrap();
        assert_eq!(
            header.encode(&record, Some(&previous)),
            strings(&["Old", "Anime", "7.5"])
        );
    }

    #[test]
    fn test_extended_appends_missing_columns() {
        let header = Header::parse(strings(&["title", "category", "tags", "rating", "review", "created_at"]));
        let extended = header.extended().unwrap();
        assert_eq!(extended.position(RecordColumn::Id), Some(6));
        assert_eq!(extended.position(RecordColumn::FileLink), Some(7));
        assert!(Header::canonical().extended().is_none());
        assert_eq!(Header::parse(vec![]).extended(), Some(Header::canonical()));
    }
}
