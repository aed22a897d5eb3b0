use std::path::PathBuf;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
    /// OTLP gRPC endpoint traces are exported to, e.g. `http://localhost:4317`.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_file() -> PathBuf {
    PathBuf::from("catalog.log")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file: default_log_file(),
            otlp_endpoint: None,
        }
    }
}
