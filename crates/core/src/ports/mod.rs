pub mod catalog_service;
pub mod command_handler;
pub mod file_storage;
pub mod record_repository;
pub mod worksheet;
