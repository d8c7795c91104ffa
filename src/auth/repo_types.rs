use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database. A code column and its expiry column are
/// always set and cleared together.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub is_active: bool,
    pub is_verified: bool,
    pub confirmation_code: Option<String>,
    pub confirmation_code_expires: Option<OffsetDateTime>,
    pub reset_code: Option<String>,
    pub reset_code_expires: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}
