use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::id::UserId;

/// Stored user account. Never leaves the service layer as-is: callers get a
/// public view without the password hash.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub admin: bool,
    pub shared_account_ids: Vec<UserId>,
    pub created_on: DateTime<Utc>,
    pub last_auth_on: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub admin: bool,
    pub shared_account_ids: Vec<String>,
    pub created_on: DateTime<Utc>,
    pub last_auth_on: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.into(),
            username: row.username,
            password_hash: row.password_hash,
            admin: row.admin,
            shared_account_ids: row.shared_account_ids.into_iter().map(UserId::from).collect(),
            created_on: row.created_on,
            last_auth_on: row.last_auth_on,
        }
    }
}
