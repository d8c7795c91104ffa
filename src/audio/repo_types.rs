use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Uploaded audio file record. The blob itself lives in storage under
/// `<file_key>_<file_name>`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AudioFile {
    pub id: i64,
    pub user_id: i64,
    pub file_key: Uuid,
    pub file_name: String,
    pub file_size: i64,
    pub format: String,
    pub duration: i64, // seconds, 0 until a transcription exists
    pub uploaded_at: OffsetDateTime,
}

impl AudioFile {
    pub fn storage_key(&self) -> String {
        format!("{}_{}", self.file_key, self.file_name)
    }
}
