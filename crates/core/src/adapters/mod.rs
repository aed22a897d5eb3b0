pub mod config;
pub mod drive;
pub mod google;
pub mod memory;
pub mod repository;
pub mod sheets;
