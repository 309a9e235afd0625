use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Account fields before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}
