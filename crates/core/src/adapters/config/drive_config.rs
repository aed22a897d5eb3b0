#[derive(serde::Deserialize, Debug, Clone)]
pub struct DriveConfig {
    /// Folder uploads are stored in.
    pub folder_id: Box<str>,
    /// Grants "anyone with the link" read access to uploaded files.
    #[serde(default = "default_share_with_anyone")]
    pub share_with_anyone: bool,
}

fn default_share_with_anyone() -> bool {
    true
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct UploadConfig {
    /// Attachments are only uploaded for records rated at least this much.
    #[serde(default = "default_min_rating")]
    pub min_rating: f64,
}

fn default_min_rating() -> f64 {
    8.0
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            min_rating: default_min_rating(),
        }
    }
}
