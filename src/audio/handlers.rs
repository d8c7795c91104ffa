use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    audio::{
        dto::{AudioFileOut, UploadResponse},
        repo_types::AudioFile,
    },
    auth::extractors::CurrentUser,
    state::AppState,
};

pub fn audio_routes() -> Router<AppState> {
    Router::new()
        .route("/audio/upload", post(upload_audio))
        .route("/audio/files", get(list_audio_files))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

/// Client-supplied names are reduced to their final path component before
/// they become part of a storage key.
fn sanitize_file_name(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("audio.bin")
        .to_string()
}

fn extension_of(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin")
}

fn mime_from_ext(ext: &str) -> &'static str {
    match ext {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// POST /audio/upload (multipart, field `file`)
#[instrument(skip(state, mp))]
pub async fn upload_audio(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut mp: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, String)> {
    let mut upload: Option<(String, Bytes)> = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("file") {
            let file_name = field
                .file_name()
                .map(sanitize_file_name)
                .unwrap_or_else(|| "audio.bin".to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
            upload = Some((file_name, data));
            break;
        }
    }
    let Some((file_name, data)) = upload else {
        return Err((StatusCode::BAD_REQUEST, "file is required".into()));
    };

    let file_key = Uuid::new_v4();
    let format = extension_of(&file_name).to_string();
    let key = format!("{}_{}", file_key, file_name);

    state
        .storage
        .put_object(&key, data.clone(), mime_from_ext(&format))
        .await
        .map_err(internal)?;

    let audio = AudioFile::insert(
        &state.db,
        user.id,
        file_key,
        &file_name,
        data.len() as i64,
        &format,
    )
    .await
    .map_err(internal)?;

    info!(user_id = %user.id, audio_id = %audio.id, key = %key, size = data.len(), "audio uploaded");
    Ok(Json(UploadResponse {
        message: "File uploaded".to_string(),
    }))
}

/// GET /audio/files
#[instrument(skip(state))]
pub async fn list_audio_files(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<AudioFileOut>>, (StatusCode, String)> {
    let files = AudioFile::list_by_user(&state.db, user.id)
        .await
        .map_err(internal)?;

    let items = files
        .into_iter()
        .map(|f| {
            let url = state.storage.download_url(&f.storage_key());
            let mime = mime_from_ext(&f.format).to_string();
            AudioFileOut::from_record(f, mime, url)
        })
        .collect();
    Ok(Json(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("note.mp3"), "note.mp3");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\music\\a.wav"), "a.wav");
        assert_eq!(sanitize_file_name("dir/"), "audio.bin");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("note.mp3"), "mp3");
        assert_eq!(extension_of("a.b.flac"), "flac");
        assert_eq!(extension_of("noext"), "bin");
        assert_eq!(extension_of("trailingdot."), "bin");
    }

    #[test]
    fn test_mime_from_ext() {
        assert_eq!(mime_from_ext("mp3"), "audio/mpeg");
        assert_eq!(mime_from_ext("wav"), "audio/wav");
        assert_eq!(mime_from_ext("ogg"), "audio/ogg");
        assert_eq!(mime_from_ext("m4a"), "audio/mp4");
        assert_eq!(mime_from_ext("xyz"), "application/octet-stream");
    }
}
