pub mod drive_manager;
