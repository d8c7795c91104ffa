use crate::auth::repo_types::User;
use sqlx::PgPool;
use time::OffsetDateTime;

impl User {
    /// Find a user by email. The match is case-sensitive, same as the
    /// unique constraint on the column.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, first_name, last_name, password_hash,
                   is_active, is_verified,
                   confirmation_code, confirmation_code_expires,
                   reset_code, reset_code_expires, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create an unverified user with a pending confirmation code.
    pub async fn create(
        db: &PgPool,
        email: &str,
        first_name: &str,
        last_name: &str,
        password_hash: &str,
        confirmation_code: &str,
        code_expires: OffsetDateTime,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, first_name, last_name, password_hash,
                               confirmation_code, confirmation_code_expires)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, first_name, last_name, password_hash,
                      is_active, is_verified,
                      confirmation_code, confirmation_code_expires,
                      reset_code, reset_code_expires, created_at
            "#,
        )
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(password_hash)
        .bind(confirmation_code)
        .bind(code_expires)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Overwrite the confirmation code of a still-unverified user. Returns
    /// false when no such user exists.
    pub async fn set_confirmation_code(
        db: &PgPool,
        email: &str,
        code: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET confirmation_code = $2, confirmation_code_expires = $3
            WHERE email = $1 AND is_verified = FALSE
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(expires)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Consume a confirmation code: the match against code and expiry and
    /// the clearing of both columns happen in one statement, so of two
    /// concurrent attempts only one can observe the code as still valid.
    pub async fn confirm_email(
        db: &PgPool,
        email: &str,
        code: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_verified = TRUE,
                confirmation_code = NULL,
                confirmation_code_expires = NULL
            WHERE email = $1
              AND confirmation_code = $2
              AND confirmation_code_expires > $3
            RETURNING id, email, first_name, last_name, password_hash,
                      is_active, is_verified,
                      confirmation_code, confirmation_code_expires,
                      reset_code, reset_code_expires, created_at
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(now)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Set a password-reset code. Returns false when the email is unknown.
    pub async fn set_reset_code(
        db: &PgPool,
        email: &str,
        code: &str,
        expires: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET reset_code = $2, reset_code_expires = $3
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(expires)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Consume a reset code and replace the password in one statement.
    /// Returns false on unknown user, code mismatch or expired code.
    pub async fn reset_password(
        db: &PgPool,
        email: &str,
        code: &str,
        now: OffsetDateTime,
        password_hash: &str,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $4,
                reset_code = NULL,
                reset_code_expires = NULL
            WHERE email = $1
              AND reset_code = $2
              AND reset_code_expires > $3
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(now)
        .bind(password_hash)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
