use error_stack::report;

use super::app_config::ConfigError;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    /// Spreadsheet id, or the URL the spreadsheet is opened with.
    pub spreadsheet: Box<str>,
    /// Worksheet title. The first worksheet is used when absent.
    #[serde(default)]
    pub worksheet: Option<Box<str>>,
}

impl SpreadsheetConfig {
    pub fn spreadsheet_id(&self) -> error_stack::Result<String, ConfigError> {
        let value = self.spreadsheet.trim();
        let invalid = || ConfigError::Invalid {
            field: "sheets.spreadsheet",
            reason: format!("'{}' is neither a spreadsheet id nor a spreadsheet URL", value),
        };

        let id = if value.starts_with("http://") || value.starts_with("https://") {
            let url = reqwest::Url::parse(value).map_err(|_| report!(invalid()))?;
            let mut segments = url.path_segments().ok_or(report!(invalid()))?;
            segments
                .by_ref()
                .find(|segment| *segment == "d")
                .and_then(|_| segments.next())
                .ok_or(report!(invalid()))?
                .to_string()
        } else {
            value.to_string()
        };

        if id.is_empty()
            || !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(report!(invalid()));
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(spreadsheet: &str) -> SpreadsheetConfig {
        SpreadsheetConfig {
            spreadsheet: spreadsheet.into(),
            worksheet: None,
        }
    }

    #[test]
    fn test_plain_id() {
        assert_eq!(
            config("1Rxp_7Ash8-B9hfw").spreadsheet_id().unwrap(),
            "1Rxp_7Ash8-B9hfw"
        );
    }

    #[test]
    fn test_id_from_url() {
        let url = "https://docs.google.com/spreadsheets/d/1Rxp_7Ash8-B9hfw/edit?gid=0#gid=0";
        assert_eq!(config(url).spreadsheet_id().unwrap(), "1Rxp_7Ash8-B9hfw");
    }

    #[test]
    fn test_rejects_url_without_id() {
        assert!(config("https://docs.google.com/spreadsheets/")
            .spreadsheet_id()
            .is_err());
        assert!(config("not an id").spreadsheet_id().is_err());
        assert!(config("").spreadsheet_id().is_err());
    }
}
