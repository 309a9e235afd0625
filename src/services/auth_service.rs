use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::user::{NewUser, UserAccount};
use crate::repositories::users::{StoreError, UserRepository};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Invalid(String),
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Invalid username or password")]
    BadCredentials,
    #[error("internal: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(_) => AuthError::UsernameTaken,
            StoreError::Backend(msg) => AuthError::Internal(msg),
        }
    }
}

/// Usernames end up in the session cookie, so only cookie-safe characters are allowed.
fn validate_credentials(username: &str, password: &str) -> Result<(), AuthError> {
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::Invalid("Username and password are required".into()));
    }
    if username.len() > 64
        || !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(AuthError::Invalid(
            "Username may only contain letters, digits, '_', '-' and '.' (max 64)".into(),
        ));
    }
    Ok(())
}

async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Internal(format!("hash failed: {}", e)))
    })
    .await
    .map_err(|e| AuthError::Internal(format!("spawn failed: {:?}", e)))?
}

async fn verify_password(password: String, stored: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored)
            .map_err(|e| AuthError::Internal(format!("stored hash unreadable: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AuthError::Internal(format!("spawn failed: {:?}", e)))?
}

pub async fn register(
    repo: &dyn UserRepository,
    username: &str,
    password: &str,
) -> Result<UserAccount, AuthError> {
    let username = username.trim();
    validate_credentials(username, password)?;

    // cheap early exit; `insert` still rejects a racing duplicate
    if repo.exists(username).await? {
        warn!("registration rejected, username taken: {}", username);
        return Err(AuthError::UsernameTaken);
    }

    let password_hash = hash_password(password.to_string()).await?;
    let account = repo
        .insert(NewUser { username: username.to_string(), password_hash })
        .await?;
    info!(
        "registered user {} (id {}) at {}",
        account.username,
        account.id,
        account.created_at.to_rfc3339()
    );
    Ok(account)
}

pub async fn login(
    repo: &dyn UserRepository,
    username: &str,
    password: &str,
) -> Result<UserAccount, AuthError> {
    let username = username.trim();
    let Some(account) = repo.find_by_username(username).await? else {
        warn!("login failed for unknown user {}", username);
        return Err(AuthError::BadCredentials);
    };

    if !verify_password(password.to_string(), account.password_hash.clone()).await? {
        warn!("login failed for {}", username);
        return Err(AuthError::BadCredentials);
    }
    Ok(account)
}
