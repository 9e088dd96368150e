//! Password hashing and server-side login sessions.
//!
//! Passwords are stored as `sha256$<salt hex>$<digest hex>` where the digest is
//! SHA-256 over the salt text followed by the password. Sessions are random
//! 32-byte tokens stored in the `sessions` table with an expiry; an expired
//! session is deleted the first time it is presented.

use crate::{
    core::{
        required_text,
        user::{self, UserInput},
    },
    entities::{Session, User, UserModel, session},
    errors::{Error, Result},
};
use chrono::{TimeDelta, Utc};
use rand::Rng;
use sea_orm::{Set, prelude::*};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

const HASH_SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;
const TOKEN_LEN: usize = 32;

/// Body of a login request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    /// Account email
    pub email: Option<String>,
    /// Plain-text password
    pub password: Option<String>,
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn random_hex<const N: usize>() -> String {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill(&mut bytes[..]);
    to_hex(&bytes)
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Hashes a password with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt = random_hex::<SALT_LEN>();
    let hash = digest(&salt, password);
    format!("{HASH_SCHEME}${salt}${hash}")
}

/// Checks a password against a stored hash. Malformed hashes never match.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(scheme), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != HASH_SCHEME {
        return false;
    }

    let actual = digest(salt, password);
    actual.len() == expected.len()
        && actual
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Creates a customer account from a public sign-up request.
///
/// # Errors
/// Same as [`user::create_user`]: missing fields or a taken email.
#[instrument(skip(db, input), fields(email = ?input.email))]
pub async fn register(db: &DatabaseConnection, input: UserInput) -> Result<UserModel> {
    user::create_user(db, input).await
}

/// Checks credentials and opens a session valid for `ttl_hours`.
///
/// # Errors
/// Returns `Validation` when the email or password is missing and
/// `InvalidCredentials` when they do not match a stored user.
#[instrument(skip(db, credentials))]
pub async fn login(
    db: &DatabaseConnection,
    credentials: Credentials,
    ttl_hours: i64,
) -> Result<(UserModel, session::Model)> {
    let email = required_text(credentials.email, "email")?;
    let password = credentials
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::validation("Missing required field: password"))?;
    let ttl = TimeDelta::try_hours(ttl_hours).ok_or_else(|| Error::Config {
        message: format!("Session lifetime of {ttl_hours} hours is out of range"),
    })?;

    let Some(account) = user::find_by_email(db, &email).await? else {
        warn!("Login attempt for unknown email");
        return Err(Error::InvalidCredentials);
    };
    if !verify_password(&password, &account.password_hash) {
        warn!(user_id = account.id, "Login attempt with wrong password");
        return Err(Error::InvalidCredentials);
    }

    let now = Utc::now();
    let session = session::ActiveModel {
        token: Set(random_hex::<TOKEN_LEN>()),
        user_id: Set(account.id),
        created_at: Set(now),
        expires_at: Set(now + ttl),
    }
    .insert(db)
    .await?;

    info!(user_id = account.id, "User logged in");
    Ok((account, session))
}

/// Ends a session. Unknown tokens are ignored.
pub async fn logout(db: &DatabaseConnection, token: &str) -> Result<()> {
    let result = Session::delete_by_id(token.to_string()).exec(db).await?;
    debug!(removed = result.rows_affected, "Session closed");
    Ok(())
}

/// Returns the user owning a live session, deleting the session if expired.
pub async fn resolve_session(db: &DatabaseConnection, token: &str) -> Result<Option<UserModel>> {
    let Some(found) = Session::find_by_id(token.to_string()).one(db).await? else {
        return Ok(None);
    };

    if found.expires_at <= Utc::now() {
        debug!(user_id = found.user_id, "Session expired");
        found.delete(db).await?;
        return Ok(None);
    }

    User::find_by_id(found.user_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Removes every expired session, returning how many were deleted.
pub async fn purge_expired_sessions(db: &DatabaseConnection) -> Result<u64> {
    let result = Session::delete_many()
        .filter(session::Column::ExpiresAt.lte(Utc::now()))
        .exec(db)
        .await?;
    if result.rows_affected > 0 {
        info!("Purged {} expired sessions", result.rows_affected);
    }
    Ok(result.rows_affected)
}
