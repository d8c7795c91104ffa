use crate::audio::repo_types::AudioFile;
use sqlx::PgPool;
use uuid::Uuid;

impl AudioFile {
    /// Record an uploaded file for a user.
    pub async fn insert(
        db: &PgPool,
        user_id: i64,
        file_key: Uuid,
        file_name: &str,
        file_size: i64,
        format: &str,
    ) -> anyhow::Result<AudioFile> {
        let file = sqlx::query_as::<_, AudioFile>(
            r#"
            INSERT INTO audio_files (user_id, file_key, file_name, file_size, format)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, file_key, file_name, file_size, format, duration, uploaded_at
            "#,
        )
        .bind(user_id)
        .bind(file_key)
        .bind(file_name)
        .bind(file_size)
        .bind(format)
        .fetch_one(db)
        .await?;
        Ok(file)
    }

    /// All files owned by a user, newest first.
    pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<AudioFile>> {
        let rows = sqlx::query_as::<_, AudioFile>(
            r#"
            SELECT id, user_id, file_key, file_name, file_size, format, duration, uploaded_at
            FROM audio_files
            WHERE user_id = $1
            ORDER BY uploaded_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
