use std::sync::Arc;

use error_stack::{report, ResultExt};
use tracing::instrument;

use crate::domain::record::{Record, RecordId, RecordPatch};
use crate::domain::sheets::{record_row::Header, row::Row};
use crate::ports::record_repository::{RecordRepository, RecordRepositoryError};
use crate::ports::worksheet::Worksheet;

/// Stores records as rows of a worksheet, one record per row below the header.
pub struct WorksheetRecordRepository {
    worksheet: Arc<dyn Worksheet>,
}

struct StoredRow {
    row: Row,
    cells: Vec<String>,
    record: Record,
}

struct Table {
    header: Header,
    rows: Vec<StoredRow>,
}

impl Table {
    fn find(&self, id: RecordId) -> error_stack::Result<&StoredRow, RecordRepositoryError> {
        self.rows
            .iter()
            .find(|stored| stored.record.id == Some(id))
            .ok_or(report!(RecordRepositoryError::NotFound(id)))
    }
}

/// First row below every non-blank row, never the header row.
fn next_free_row(rows: &[Vec<String>]) -> Row {
    let used = rows
        .iter()
        .rposition(|cells| cells.iter().any(|cell| !cell.trim().is_empty()))
        .map(|last| last + 1)
        .unwrap_or(0);
    Row::for_record(used.saturating_sub(1))
}

impl WorksheetRecordRepository {
    pub fn new(worksheet: Arc<dyn Worksheet>) -> Self {
        Self { worksheet }
    }

    async fn load(&self) -> error_stack::Result<Table, RecordRepositoryError> {
        let mut rows = self
            .worksheet
            .read_rows()
            .await
            .change_context(RecordRepositoryError::ReadError)?
            .into_iter();

        let header = Header::parse(rows.next().unwrap_or_default());

        let mut stored = Vec::new();
        for (position, cells) in rows.enumerate() {
            let row = Row::for_record(position);
            if let Some(record) = header
                .decode(row, &cells)
                .change_context(RecordRepositoryError::ReadError)?
            {
                stored.push(StoredRow { row, cells, record });
            }
        }

        Ok(Table {
            header,
            rows: stored,
        })
    }

    /// Makes sure the live header names every record column, extending it in
    /// place when columns are missing.
    async fn ensure_header(&self, header: Header) -> error_stack::Result<Header, RecordRepositoryError> {
        match header.extended() {
            Some(extended) => {
                tracing::info!(
                    "Extending header row with missing columns: {:?}",
                    header
                        .missing_columns()
                        .iter()
                        .map(|column| column.name())
                        .collect::<Vec<_>>()
                );
                self.worksheet
                    .write_row(Row::HEADER, extended.cells().to_vec())
                    .await
                    .change_context(RecordRepositoryError::WriteError)
                    .attach_printable("Failed to write the header row")?;
                Ok(extended)
            }
            None => Ok(header),
        }
    }
}

#[async_trait::async_trait]
impl RecordRepository for WorksheetRecordRepository {
    async fn location(&self) -> error_stack::Result<String, RecordRepositoryError> {
        self.worksheet
            .title()
            .await
            .map(|title| format!("worksheet '{}'", title))
            .change_context(RecordRepositoryError::ReadError)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> error_stack::Result<Vec<Record>, RecordRepositoryError> {
        let table = self.load().await?;
        tracing::debug!("Loaded {} records", table.rows.len());
        Ok(table.rows.into_iter().map(|stored| stored.record).collect())
    }

    #[instrument(skip(self, record), fields(title = %record.title))]
    async fn append(&self, record: &Record) -> error_stack::Result<(), RecordRepositoryError> {
        record
            .validate()
            .change_context(RecordRepositoryError::InvalidRecord)?;

        let rows = self
            .worksheet
            .read_rows()
            .await
            .change_context(RecordRepositoryError::ReadError)?;
        let target = next_free_row(&rows);
        let first_row = rows.into_iter().next().unwrap_or_default();
        let header = self.ensure_header(Header::parse(first_row)).await?;

        self.worksheet
            .append_row(target, header.encode(record, None))
            .await
            .change_context(RecordRepositoryError::WriteError)
            .attach_printable_lazy(|| format!("Appending at row {}", target))
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        id: RecordId,
        patch: &RecordPatch,
    ) -> error_stack::Result<Record, RecordRepositoryError> {
        let table = self.load().await?;
        let stored = table.find(id)?;

        let updated = patch
            .apply(&stored.record)
            .change_context(RecordRepositoryError::InvalidRecord)
            .attach_printable_lazy(|| format!("Record {} in row {}", id, stored.row))?;

        let header = self.ensure_header(table.header.clone()).await?;
        self.worksheet
            .write_row(stored.row, header.encode(&updated, Some(&stored.cells)))
            .await
            .change_context(RecordRepositoryError::WriteError)
            .attach_printable_lazy(|| format!("Record {} in row {}", id, stored.row))?;

        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: RecordId) -> error_stack::Result<Record, RecordRepositoryError> {
        let table = self.load().await?;
        let stored = table.find(id)?;

        self.worksheet
            .delete_row(stored.row)
            .await
            .change_context(RecordRepositoryError::WriteError)
            .attach_printable_lazy(|| format!("Record {} in row {}", id, stored.row))?;

        Ok(stored.record.clone())
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn replace_all(
        &self,
        records: &[Record],
    ) -> error_stack::Result<(), RecordRepositoryError> {
        for (position, record) in records.iter().enumerate() {
            record
                .validate()
                .change_context(RecordRepositoryError::InvalidRecord)
                .attach_printable_lazy(|| {
                    format!("Record #{} ('{}')", position + 1, record.title)
                })?;
        }

        let header = Header::canonical();
        let mut rows = Vec::with_capacity(records.len() + 1);
        rows.push(header.cells().to_vec());
        rows.extend(records.iter().map(|record| header.encode(record, None)));

        self.worksheet
            .overwrite(rows)
            .await
            .change_context(RecordRepositoryError::WriteError)
    }

    /// Rewrites the sheet through the extended header, keeping the cells of
    /// every row; rows that already had an id are written back unchanged.
    /// Blank rows between records are dropped.
    #[instrument(skip(self))]
    async fn assign_missing_ids(&self) -> error_stack::Result<usize, RecordRepositoryError> {
        let table = self.load().await?;
        let missing = table
            .rows
            .iter()
            .filter(|stored| stored.record.id.is_none())
            .count();
        if missing == 0 {
            return Ok(0);
        }

        let header = table.header.extended().unwrap_or(table.header);
        let mut rows = Vec::with_capacity(table.rows.len() + 1);
        rows.push(header.cells().to_vec());
        for stored in table.rows {
            let mut record = stored.record;
            if record.id.is_none() {
                record.id = Some(RecordId::generate());
            }
            rows.push(header.encode(&record, Some(&stored.cells)));
        }

        self.worksheet
            .overwrite(rows)
            .await
            .change_context(RecordRepositoryError::WriteError)?;
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::memory_worksheet::MemoryWorksheet;
    use crate::domain::record::{Category, Rating, RecordDraft};

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn record(title: &str, category: Category, rating: f64) -> Record {
        RecordDraft::new(title, category, Rating::new(rating).unwrap())
            .into_record("2024-05-01 12:00:00.000000".to_string(), None)
    }

    fn repository() -> (Arc<MemoryWorksheet>, WorksheetRecordRepository) {
        let worksheet = Arc::new(MemoryWorksheet::new("Sheet1"));
        let repository = WorksheetRecordRepository::new(worksheet.clone());
        (worksheet, repository)
    }

    #[tokio::test]
    async fn test_append_then_list_returns_exactly_that_row() {
        let (_, repository) = repository();
        let x = record("X", Category::Av, 9.0);

        repository.append(&x).await.unwrap();

        let records = repository.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "X");
        assert_eq!(records[0].category, Category::Av);
        assert_eq!(records[0].rating.value(), 9.0);
        assert_eq!(records[0], x);
    }

    #[tokio::test]
    async fn test_append_to_empty_sheet_writes_header_first() {
        let (worksheet, repository) = repository();
        repository
            .append(&record("X", Category::Av, 9.0))
            .await
            .unwrap();

        let rows = worksheet.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], Header::canonical().cells().to_vec());
    }

    #[tokio::test]
    async fn test_append_follows_legacy_column_order() {
        let (worksheet, repository) = repository();
        worksheet.seed(vec![strings(&[
            "title",
            "category",
            "tags",
            "rating",
            "review",
            "created_at",
        ])]);

        let x = record("X", Category::Av, 9.0);
        repository.append(&x).await.unwrap();

        let rows = worksheet.rows();
        assert_eq!(rows[0][6], "id");
        assert_eq!(rows[0][7], "file_link");
        assert_eq!(rows[1][0], "X");
        assert_eq!(rows[1][6], x.id.unwrap().to_string());
    }

    #[tokio::test]
    async fn test_list_tolerates_missing_file_link_column() {
        let (worksheet, repository) = repository();
        worksheet
            .overwrite(vec![
                strings(&["title", "category", "tags", "rating", "review", "created_at"]),
                strings(&["Dune", "Novel", "scifi", "8.5", "", "2023-01-01 00:00:00"]),
            ])
            .await
            .unwrap();

        let records = repository.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_link, None);
        assert_eq!(records[0].id, None);
    }

    #[tokio::test]
    async fn test_replace_all_with_no_records_leaves_only_header() {
        let (worksheet, repository) = repository();
        repository
            .append(&record("X", Category::Av, 9.0))
            .await
            .unwrap();

        repository.replace_all(&[]).await.unwrap();

        assert!(repository.list().await.unwrap().is_empty());
        assert_eq!(worksheet.rows(), vec![Header::canonical().cells().to_vec()]);
    }

    #[tokio::test]
    async fn test_replace_all_rejects_invalid_record_before_writing() {
        let (worksheet, repository) = repository();
        let mut invalid = record("X", Category::Av, 9.0);
        invalid.title = String::new();

        let report = repository.replace_all(&[invalid]).await.unwrap_err();
        assert_eq!(
            report.current_context(),
            &RecordRepositoryError::InvalidRecord
        );
        assert_eq!(worksheet.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_rewrites_only_the_addressed_row() {
        let (worksheet, repository) = repository();
        let a = record("A", Category::Novel, 5.0);
        let b = record("B", Category::Manga, 6.0);
        repository.append(&a).await.unwrap();
        repository.append(&b).await.unwrap();
        let before = worksheet.rows();

        let patch = RecordPatch {
            title: Some("B2".to_string()),
            ..Default::default()
        };
        let updated = repository.update(b.id.unwrap(), &patch).await.unwrap();

        assert_eq!(updated.title, "B2");
        let after = worksheet.rows();
        assert_eq!(after[1], before[1]);
        assert_eq!(after[2][1], "B2");
        assert_eq!(after[2][0], b.id.unwrap().to_string());
    }

    #[tokio::test]
    async fn test_update_keeps_unknown_columns() {
        let (worksheet, repository) = repository();
        let a = record("A", Category::Novel, 5.0);
        let id = a.id.unwrap().to_string();
        worksheet.seed(vec![
            strings(&[
                "id",
                "title",
                "category",
                "tags",
                "rating",
                "review",
                "created_at",
                "file_link",
                "notes",
            ]),
            strings(&[&id, "A", "Novel", "", "5.0", "", "", "", "hand written"]),
        ]);

        let patch = RecordPatch {
            rating: Some(Rating::new(6.5).unwrap()),
            ..Default::default()
        };
        repository.update(a.id.unwrap(), &patch).await.unwrap();

        let rows = worksheet.rows();
        assert_eq!(rows[1][4], "6.5");
        assert_eq!(rows[1][8], "hand written");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (_, repository) = repository();
        repository
            .append(&record("A", Category::Novel, 5.0))
            .await
            .unwrap();

        let missing = RecordId::generate();
        let report = repository
            .update(missing, &RecordPatch::default())
            .await
            .unwrap_err();
        assert_eq!(
            report.current_context(),
            &RecordRepositoryError::NotFound(missing)
        );
    }

    #[tokio::test]
    async fn test_delete_removes_only_the_addressed_row() {
        let (_, repository) = repository();
        let a = record("A", Category::Novel, 5.0);
        let b = record("B", Category::Manga, 6.0);
        let c = record("C", Category::Anime, 7.0);
        for r in [&a, &b, &c] {
            repository.append(r).await.unwrap();
        }

        let deleted = repository.delete(b.id.unwrap()).await.unwrap();
        assert_eq!(deleted, b);

        let remaining = repository.list().await.unwrap();
        assert_eq!(remaining, vec![a, c]);
    }

    #[tokio::test]
    async fn test_blank_rows_are_skipped_and_rows_stay_addressed() {
        let (worksheet, repository) = repository();
        let a = record("A", Category::Novel, 5.0);
        let b = record("B", Category::Manga, 6.0);
        let header = Header::canonical();
        worksheet.seed(vec![
            header.cells().to_vec(),
            header.encode(&a, None),
            vec![],
            header.encode(&b, None),
        ]);

        assert_eq!(repository.list().await.unwrap().len(), 2);

        repository.delete(b.id.unwrap()).await.unwrap();
        assert_eq!(worksheet.rows().len(), 3);
        assert_eq!(repository.list().await.unwrap(), vec![a]);
    }

    #[tokio::test]
    async fn test_append_lands_below_the_last_record_past_blank_rows() {
        let (worksheet, repository) = repository();
        let a = record("A", Category::Novel, 5.0);
        let b = record("B", Category::Manga, 6.0);
        let c = record("C", Category::Anime, 7.0);
        let header = Header::canonical();
        worksheet.seed(vec![
            header.cells().to_vec(),
            header.encode(&a, None),
            vec![],
            header.encode(&b, None),
        ]);

        repository.append(&c).await.unwrap();

        let rows = worksheet.rows();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4][1], "C");
        assert_eq!(repository.list().await.unwrap(), vec![a, b, c]);
    }

    #[tokio::test]
    async fn test_append_skips_trailing_blank_rows() {
        let (worksheet, repository) = repository();
        let a = record("A", Category::Novel, 5.0);
        let header = Header::canonical();
        worksheet.seed(vec![
            header.cells().to_vec(),
            header.encode(&a, None),
            vec![String::new(), " ".to_string()],
        ]);

        let b = record("B", Category::Manga, 6.0);
        repository.append(&b).await.unwrap();

        assert_eq!(worksheet.rows()[2][1], "B");
        assert_eq!(repository.list().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_update_keeps_legacy_category_label() {
        let (worksheet, repository) = repository();
        let a = record("A", Category::Doujin, 5.0);
        let id = a.id.unwrap().to_string();
        worksheet.seed(vec![
            strings(&["id", "title", "category", "rating"]),
            strings(&[&id, "A", "同人本", "5"]),
        ]);

        let patch = RecordPatch {
            rating: Some(Rating::new(6.5).unwrap()),
            ..Default::default()
        };
        repository.update(a.id.unwrap(), &patch).await.unwrap();

        let rows = worksheet.rows();
        assert_eq!(rows[1][2], "同人本");
        assert_eq!(rows[1][3], "6.5");
    }

    #[tokio::test]
    async fn test_assign_missing_ids_keeps_other_cells() {
        let (worksheet, repository) = repository();
        let kept = record("Kept", Category::Av, 9.0);
        let kept_id = kept.id.unwrap().to_string();
        worksheet.seed(vec![
            strings(&["title", "category", "rating", "notes", "id"]),
            strings(&["Old", "小说", "8", "hand written", ""]),
            vec![],
            strings(&["Kept", "AV", "9.0", "", &kept_id]),
        ]);

        assert_eq!(repository.assign_missing_ids().await.unwrap(), 1);

        let rows = worksheet.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][..5], ["title", "category", "rating", "notes", "id"]);
        assert_eq!(rows[1][..4], ["Old", "小说", "8", "hand written"]);
        assert!(!rows[1][4].is_empty());
        assert_eq!(rows[2][4], kept_id);

        let records = repository.list().await.unwrap();
        assert_eq!(records[1].id, kept.id);
        assert_eq!(records[1].title, "Kept");
        assert!(records[0].id.is_some());

        let writes = worksheet.write_count();
        assert_eq!(repository.assign_missing_ids().await.unwrap(), 0);
        assert_eq!(worksheet.write_count(), writes);
    }

    #[tokio::test]
    async fn test_read_failure_names_row() {
        let (worksheet, repository) = repository();
        worksheet.seed(vec![
            strings(&["title", "category", "rating"]),
            strings(&["Dune", "Podcast", "5"]),
        ]);

        let report = repository.list().await.unwrap_err();
        assert_eq!(report.current_context(), &RecordRepositoryError::ReadError);
        assert!(format!("{:?}", report).contains("row 2"));
    }
}
