pub mod worksheet_record_repository;
