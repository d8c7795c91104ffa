use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::audio::repo_types::AudioFile;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    pub language: String,
    pub text: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioMetadata {
    pub original_name: String,
    pub duration: i64,
    pub extension: String,
    pub transcription: Transcription,
    pub file_size: i64,
    pub format: String,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
    pub mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFileOut {
    pub user_id: i64,
    pub file_key: Uuid,
    pub file_name: String,
    pub file_size: i64,
    pub duration: i64,
    pub format: String,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_modified: OffsetDateTime,
    pub status: String,
    pub metadata: AudioMetadata,
    pub download_url: String,
}

impl AudioFileOut {
    pub fn from_record(file: AudioFile, mime_type: String, download_url: String) -> Self {
        Self {
            user_id: file.user_id,
            file_key: file.file_key,
            file_name: file.file_name.clone(),
            file_size: file.file_size,
            duration: file.duration,
            format: file.format.clone(),
            uploaded_at: file.uploaded_at,
            last_modified: file.uploaded_at,
            status: "ready".to_string(),
            metadata: AudioMetadata {
                original_name: file.file_name,
                duration: file.duration,
                extension: file.format.clone(),
                transcription: Transcription {
                    language: "en".to_string(),
                    text: String::new(),
                    status: "pending".to_string(),
                },
                file_size: file.file_size,
                format: file.format,
                uploaded_at: file.uploaded_at,
                mime_type,
            },
            download_url,
        }
    }
}

/// Acknowledgement returned by the upload endpoint.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_out_uses_camel_case_and_nests_metadata() {
        let file = AudioFile {
            id: 1,
            user_id: 7,
            file_key: Uuid::new_v4(),
            file_name: "note.mp3".into(),
            file_size: 1024,
            format: "mp3".into(),
            duration: 0,
            uploaded_at: OffsetDateTime::UNIX_EPOCH,
        };
        let out = AudioFileOut::from_record(
            file,
            "audio/mpeg".into(),
            "http://localhost:8080/uploads/k_note.mp3".into(),
        );
        let json = serde_json::to_string(&out).unwrap();
        assert!(json.contains("fileKey"));
        assert!(json.contains("downloadUrl"));
        assert!(json.contains("originalName"));
        assert!(json.contains("mimeType"));
        assert!(json.contains("audio/mpeg"));
        assert!(json.contains("\"status\":\"ready\""));
    }
}
