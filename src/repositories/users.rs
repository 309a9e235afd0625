use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, MySql, Pool, Row};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::user::{NewUser, UserAccount};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("username `{0}` is taken")]
    Duplicate(String),
    #[error("store: {0}")]
    Backend(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError>;
    /// Inserts unless the username exists; the check and the write are one step.
    async fn insert(&self, user: NewUser) -> Result<UserAccount, StoreError>;
    async fn exists(&self, username: &str) -> Result<bool, StoreError>;
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, UserAccount>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserAccount, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(StoreError::Duplicate(user.username));
        }
        let account = UserAccount {
            id: users.len() as i64 + 1,
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(account.username.clone(), account.clone());
        Ok(account)
    }

    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.users.read().await.contains_key(username))
    }
}

/// `users` table in MySQL; uniqueness is enforced by the `UNIQUE` key on `username`.
pub struct MySqlUserRepository {
    pool: Pool<MySql>,
}

impl MySqlUserRepository {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

fn row_to_account(r: MySqlRow) -> Result<UserAccount, StoreError> {
    let backend = |e: sqlx::Error| StoreError::Backend(e.to_string());
    Ok(UserAccount {
        id: r.try_get::<i64, _>("id").map_err(backend)?,
        username: r.try_get::<String, _>("username").map_err(backend)?,
        password_hash: r.try_get::<String, _>("password_hash").map_err(backend)?,
        created_at: r.try_get::<DateTime<Utc>, _>("created_at").map_err(backend)?,
    })
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ? LIMIT 1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(row_to_account).transpose()
    }

    async fn insert(&self, user: NewUser) -> Result<UserAccount, StoreError> {
        let created_at = Utc::now();
        let res = sqlx::query(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(done) => Ok(UserAccount {
                id: done.last_insert_id() as i64,
                username: user.username,
                password_hash: user.password_hash,
                created_at,
            }),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(user.username))
            }
            Err(e) => Err(StoreError::Backend(e.to_string())),
        }
    }

    async fn exists(&self, username: &str) -> Result<bool, StoreError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ? LIMIT 1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(found.is_some())
    }
}

pub type SharedUserRepository = Arc<dyn UserRepository>;
