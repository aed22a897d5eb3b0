pub mod memory_file_storage;
pub mod memory_worksheet;
