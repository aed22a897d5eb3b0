pub mod app_config;
pub mod credentials;
pub mod drive_config;
pub mod logging_config;
pub mod sheets_config;
