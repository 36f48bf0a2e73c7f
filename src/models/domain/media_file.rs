use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFile {
    pub id: String,
    pub filename: String, // name on disk, unique
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub url: String,
    #[serde(rename = "type")]
    pub media_type: String, // top-level MIME type: image, video, audio, application
    pub created_at: DateTime<Utc>,
}

impl MediaFile {
    pub fn new(filename: &str, original_name: &str, mime_type: &str, size: u64) -> Self {
        MediaFile {
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            size,
            url: format!("/uploads/{}", filename),
            media_type: mime_type.split('/').next().unwrap_or_default().to_string(),
            created_at: Utc::now(),
        }
    }
}
