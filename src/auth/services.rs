pub(crate) use crate::auth::dto::{Claims, JwtKeys, TokenKind};
use crate::auth::repo_types::User;
use crate::config::JwtConfig;
use crate::state::AppState;
use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use rand::{rngs::OsRng, RngCore};
use regex::Regex;
use sqlx::PgPool;
use std::time::Duration;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Fail closed: a stored hash that does not parse counts as a mismatch,
/// never as an error into caller logic.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

/// Six uppercase hex characters from the OS RNG, human-typable, used for
/// both confirmation and reset codes.
pub fn generate_code() -> String {
    let mut raw = [0u8; 3];
    OsRng.fill_bytes(&mut raw);
    raw.iter().map(|b| format!("{b:02X}")).collect()
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            access_ttl_minutes,
            refresh_ttl_days,
            ..
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            access_ttl: Duration::from_secs((access_ttl_minutes as u64) * 60),
            refresh_ttl: Duration::from_secs((refresh_ttl_days as u64) * 24 * 60 * 60),
        }
    }
}

impl JwtKeys {
    fn sign_with_kind_at(
        &self,
        email: &str,
        kind: TokenKind,
        now: OffsetDateTime,
    ) -> anyhow::Result<(String, i64)> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(email = %email, kind = ?kind, "jwt signed");
        Ok((token, exp.unix_timestamp()))
    }

    /// Returns the token together with its expiry as epoch seconds.
    pub fn sign_access(&self, email: &str) -> anyhow::Result<(String, i64)> {
        self.sign_with_kind_at(email, TokenKind::Access, OffsetDateTime::now_utc())
    }

    pub fn sign_refresh(&self, email: &str) -> anyhow::Result<String> {
        self.sign_with_kind_at(email, TokenKind::Refresh, OffsetDateTime::now_utc())
            .map(|(token, _)| token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        // A token is invalid the instant its expiry passes.
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(email = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> anyhow::Result<Claims> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            anyhow::bail!("not a refresh token");
        }
        Ok(claims)
    }
}

/// Resolve a bearer token to its account. Every failure mode collapses to
/// `None`: bad signature, expiry, malformed payload, wrong token kind,
/// unknown subject, and accounts that are inactive or unverified all look
/// the same to the caller.
pub async fn resolve_user(db: &PgPool, keys: &JwtKeys, token: &str) -> Option<User> {
    let claims = match keys.verify(token) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "token rejected");
            return None;
        }
    };
    if claims.kind != TokenKind::Access {
        debug!("non-access token on authenticated endpoint");
        return None;
    }
    let user = match User::find_by_email(db, &claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => return None,
        Err(e) => {
            error!(error = %e, "find_by_email failed during token resolution");
            return None;
        }
    };
    if user.is_active && user.is_verified {
        Some(user)
    } else {
        None
    }
}

#[cfg(test)]
mod password_tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn hashing_salts_every_call() {
        let password = "same-input";
        let first = hash_password(password).expect("hash");
        let second = hash_password(password).expect("hash");
        assert_ne!(first, second);
        assert!(verify_password(password, &first));
        assert!(verify_password(password, &second));
    }

    #[test]
    fn verify_fails_closed_on_malformed_hash() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
        assert!(!verify_password("anything", ""));
    }
}

#[cfg(test)]
mod code_tests {
    use super::*;

    #[test]
    fn code_is_six_uppercase_hex_chars() {
        for _ in 0..32 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }

    #[test]
    fn codes_differ_between_draws() {
        let codes: std::collections::HashSet<String> = (0..16).map(|_| generate_code()).collect();
        assert!(codes.len() > 1);
    }
}

#[cfg(test)]
mod jwt_tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    fn keys_with_secret(secret: &str) -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            access_ttl: Duration::from_secs(300),
            refresh_ttl: Duration::from_secs(3600),
        }
    }

    #[tokio::test]
    async fn sign_and_verify_access_token() {
        let keys = make_keys();
        let (token, expires_at) = keys.sign_access("a@x.com").expect("sign access");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp as i64, expires_at);
        assert!(expires_at > OffsetDateTime::now_utc().unix_timestamp());
    }

    #[tokio::test]
    async fn sign_and_verify_refresh_token_and_verify_refresh() {
        let keys = make_keys();
        let token = keys.sign_refresh("a@x.com").expect("sign refresh");
        let claims = keys.verify_refresh(&token).expect("verify refresh");
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[tokio::test]
    async fn verify_refresh_rejects_access_token() {
        let keys = make_keys();
        let (token, _) = keys.sign_access("a@x.com").expect("sign access");
        let err = keys.verify_refresh(&token).unwrap_err();
        assert!(err.to_string().contains("not a refresh token"));
    }

    #[tokio::test]
    async fn verify_rejects_expired_token() {
        let keys = make_keys();
        // access_ttl is 5 minutes, so an hour-old issue instant is well past expiry
        let past = OffsetDateTime::now_utc() - TimeDuration::hours(1);
        let (token, _) = keys
            .sign_with_kind_at("a@x.com", TokenKind::Access, past)
            .expect("sign in the past");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_accepts_token_close_to_expiry() {
        let keys = make_keys();
        // issued so that ~10 seconds of validity remain
        let issue = OffsetDateTime::now_utc() - TimeDuration::seconds(290);
        let (token, _) = keys
            .sign_with_kind_at("a@x.com", TokenKind::Access, issue)
            .expect("sign");
        assert!(keys.verify(&token).is_ok());
    }

    #[tokio::test]
    async fn verify_rejects_wrong_secret() {
        let good = keys_with_secret("secret-one");
        let bad = keys_with_secret("secret-two");
        let (token, _) = good.sign_access("a@x.com").expect("sign access");
        assert!(bad.verify(&token).is_err());
    }

    #[tokio::test]
    async fn verify_rejects_garbage() {
        let keys = make_keys();
        assert!(keys.verify("not-a-jwt").is_err());
        assert!(keys.verify("").is_err());
    }
}

#[cfg(test)]
mod resolve_tests {
    use super::*;

    // resolve_user paths that fail before the user lookup: the lazy test
    // pool never has to connect.

    #[tokio::test]
    async fn resolve_user_is_none_for_invalid_token() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        assert!(resolve_user(&state.db, &keys, "garbage").await.is_none());
    }

    #[tokio::test]
    async fn resolve_user_is_none_for_refresh_token() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.sign_refresh("a@x.com").expect("sign refresh");
        assert!(resolve_user(&state.db, &keys, &token).await.is_none());
    }

    #[tokio::test]
    async fn resolve_user_is_none_for_expired_token() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let past = OffsetDateTime::now_utc() - TimeDuration::hours(1);
        let (token, _) = keys
            .sign_with_kind_at("a@x.com", TokenKind::Access, past)
            .expect("sign");
        assert!(resolve_user(&state.db, &keys, &token).await.is_none());
    }
}
