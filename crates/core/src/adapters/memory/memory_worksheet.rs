use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

use error_stack::report;

use crate::domain::sheets::row::Row;
use crate::ports::worksheet::{Worksheet, WorksheetError};

/// Worksheet kept in memory. Mirrors how the Sheets API treats trailing empty
/// cells; appended rows are inserted exactly where they are addressed.
pub struct MemoryWorksheet {
    title: String,
    rows: Mutex<Vec<Vec<String>>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl std::fmt::Debug for MemoryWorksheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MemoryWorksheet {{ title: {:?} }}", self.title)
    }
}

fn trim_trailing_cells(mut row: Vec<String>) -> Vec<String> {
    while row.last().is_some_and(|cell| cell.is_empty()) {
        row.pop();
    }
    row
}

impl MemoryWorksheet {
    pub fn new(title: impl Into<String>) -> Self {
        MemoryWorksheet {
            title: title.into(),
            rows: Mutex::new(Vec::new()),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Replaces the content without counting it as a write.
    pub fn seed(&self, rows: Vec<Vec<String>>) {
        *self.lock() = rows;
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        self.lock().clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of calls of any kind made through the `Worksheet` port.
    pub fn call_count(&self) -> usize {
        self.read_count() + self.write_count()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<String>>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_read(&self) -> error_stack::Result<(), WorksheetError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(report!(WorksheetError::FailedToRead));
        }
        Ok(())
    }

    fn begin_write(&self) -> error_stack::Result<(), WorksheetError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(report!(WorksheetError::FailedToWrite));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Worksheet for MemoryWorksheet {
    async fn title(&self) -> error_stack::Result<String, WorksheetError> {
        Ok(self.title.clone())
    }

    async fn read_rows(&self) -> error_stack::Result<Vec<Vec<String>>, WorksheetError> {
        self.begin_read()?;
        let mut rows: Vec<Vec<String>> = self
            .lock()
            .iter()
            .cloned()
            .map(trim_trailing_cells)
            .collect();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn append_row(
        &self,
        row: Row,
        values: Vec<String>,
    ) -> error_stack::Result<(), WorksheetError> {
        self.begin_write()?;
        let mut rows = self.lock();
        let index = row.index() as usize;
        if rows.len() < index {
            rows.resize(index, Vec::new());
        }
        rows.insert(index, values);
        Ok(())
    }

    async fn write_row(
        &self,
        row: Row,
        values: Vec<String>,
    ) -> error_stack::Result<(), WorksheetError> {
        self.begin_write()?;
        let mut rows = self.lock();
        let index = row.index() as usize;
        if rows.len() <= index {
            rows.resize(index + 1, Vec::new());
        }
        let target = &mut rows[index];
        if target.len() < values.len() {
            target.resize(values.len(), String::new());
        }
        for (position, value) in values.into_iter().enumerate() {
            target[position] = value;
        }
        Ok(())
    }

    async fn delete_row(&self, row: Row) -> error_stack::Result<(), WorksheetError> {
        self.begin_write()?;
        let mut rows = self.lock();
        let index = row.index() as usize;
        if index < rows.len() {
            rows.remove(index);
        }
        Ok(())
    }

    async fn overwrite(&self, rows: Vec<Vec<String>>) -> error_stack::Result<(), WorksheetError> {
        self.begin_write()?;
        *self.lock() = rows;
        Ok(())
    }
}
