use config::Config;
use error_stack::{report, ResultExt};
use thiserror::Error;

use super::{
    credentials::CredentialSource,
    drive_config::{DriveConfig, UploadConfig},
    logging_config::LoggingConfig,
    sheets_config::SpreadsheetConfig,
};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "Config";
/// Prefix of environment variables overriding configuration values,
/// e.g. `CATALOG__SHEETS__WORKSHEET`.
pub const ENV_PREFIX: &str = "CATALOG";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read configuration")]
    Load,
    #[error("Failed to deserialize configuration field '{0}'")]
    Deserialize(String),
    #[error("Invalid configuration value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub sheets: SpreadsheetConfig,
    pub credentials: CredentialSource,
    #[serde(default)]
    pub drive: Option<DriveConfig>,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads the file named by `CONFIG_PATH` (default `Config`), applies
    /// environment overrides and validates the result.
    pub fn load() -> error_stack::Result<Self, ConfigError> {
        let config_path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &str) -> error_stack::Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(config::File::with_name(config_path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .change_context(ConfigError::Load)
            .attach_printable_lazy(|| format!("Config file: {}", config_path))?;

        let value = config
            .try_deserialize::<serde_json::Value>()
            .change_context(ConfigError::Load)
            .attach_printable_lazy(|| format!("Config file: {}", config_path))?;

        Self::from_value(value).attach_printable_lazy(|| format!("Config file: {}", config_path))
    }

    pub fn from_value(value: serde_json::Value) -> error_stack::Result<Self, ConfigError> {
        let config: AppConfig = serde_path_to_error::deserialize(value).map_err(|e| {
            let path = e.path().to_string();
            report!(ConfigError::Deserialize(path))
                .attach_printable(e.into_inner().to_string())
                .attach_printable("Make sure all required fields are present in the configuration file.")
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> error_stack::Result<(), ConfigError> {
        self.sheets.spreadsheet_id()?;

        if let Some(worksheet) = &self.sheets.worksheet {
            if worksheet.trim().is_empty() {
                return Err(report!(ConfigError::Invalid {
                    field: "sheets.worksheet",
                    reason: "must not be empty when present".to_string(),
                }));
            }
        }

        if let Some(drive) = &self.drive {
            if drive.folder_id.trim().is_empty() {
                return Err(report!(ConfigError::Invalid {
                    field: "drive.folder_id",
                    reason: "must not be empty".to_string(),
                }));
            }
        }

        let min_rating = self.upload.min_rating;
        if !(0.0..=10.0).contains(&min_rating) {
            return Err(report!(ConfigError::Invalid {
                field: "upload.min_rating",
                reason: format!("{} is outside of 0..=10", min_rating),
            }));
        }

        Ok(())
    }
}
