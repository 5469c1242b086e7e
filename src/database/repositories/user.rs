use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::database::models::user::{UserRecord, UserRow};
use crate::database::{StoreError, StoreResult};
use crate::id::UserId;

/// Lookup key: users are unique by id and by username.
#[derive(Debug, Clone, Copy)]
pub enum UserKey<'a> {
    Id(&'a UserId),
    Username(&'a str),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find(&self, key: UserKey<'_>) -> StoreResult<Option<UserRecord>>;

    /// Records for the ids that exist, in input order. Missing ids are skipped.
    async fn find_many_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<UserRecord>>;

    /// Records for the usernames that exist, in input order. Missing names are skipped.
    async fn find_many_by_usernames(&self, usernames: &[String]) -> StoreResult<Vec<UserRecord>>;

    /// Fails with `AlreadyExists` when the id or username is taken.
    async fn insert(&self, user: UserRecord) -> StoreResult<UserRecord>;

    /// Replaces the record with the same id. `AlreadyExists` if the new username
    /// belongs to another account.
    async fn update(&self, user: UserRecord) -> StoreResult<UserRecord>;

    async fn delete(&self, id: &UserId) -> StoreResult<()>;

    async fn list(&self) -> StoreResult<Vec<UserRecord>>;
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn username_taken(users: &HashMap<UserId, UserRecord>, username: &str, except: &UserId) -> bool {
    users
        .values()
        .any(|u| u.username == username && &u.id != except)
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find(&self, key: UserKey<'_>) -> StoreResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(match key {
            UserKey::Id(id) => users.get(id).cloned(),
            UserKey::Username(name) => users.values().find(|u| u.username == name).cloned(),
        })
    }

    async fn find_many_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<UserRecord>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn find_many_by_usernames(&self, usernames: &[String]) -> StoreResult<Vec<UserRecord>> {
        let users = self.users.read().await;
        Ok(usernames
            .iter()
            .filter_map(|name| users.values().find(|u| &u.username == name).cloned())
            .collect())
    }

    async fn insert(&self, user: UserRecord) -> StoreResult<UserRecord> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || username_taken(&users, &user.username, &user.id) {
            return Err(StoreError::AlreadyExists);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn update(&self, user: UserRecord) -> StoreResult<UserRecord> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound);
        }
        if username_taken(&users, &user.username, &user.id) {
            return Err(StoreError::AlreadyExists);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> StoreResult<()> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> StoreResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str =
    "id, username, password_hash, admin, shared_account_ids, created_on, last_auth_on";

fn id_strings(ids: &[UserId]) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_string()).collect()
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find(&self, key: UserKey<'_>) -> StoreResult<Option<UserRecord>> {
        let (column, value) = match key {
            UserKey::Id(id) => ("id", id.as_str()),
            UserKey::Username(name) => ("username", name),
        };
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn find_many_by_ids(&self, ids: &[UserId]) -> StoreResult<Vec<UserRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id_strings(ids))
            .fetch_all(&self.pool)
            .await?;
        let mut by_id: HashMap<UserId, UserRecord> = rows
            .into_iter()
            .map(|row| {
                let user = UserRecord::from(row);
                (user.id.clone(), user)
            })
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn find_many_by_usernames(&self, usernames: &[String]) -> StoreResult<Vec<UserRecord>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ANY($1)");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(usernames)
            .fetch_all(&self.pool)
            .await?;
        let mut by_name: HashMap<String, UserRecord> = rows
            .into_iter()
            .map(|row| (row.username.clone(), UserRecord::from(row)))
            .collect();
        Ok(usernames
            .iter()
            .filter_map(|name| by_name.remove(name))
            .collect())
    }

    async fn insert(&self, user: UserRecord) -> StoreResult<UserRecord> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, admin, shared_account_ids, created_on, last_auth_on)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.admin)
        .bind(id_strings(&user.shared_account_ids))
        .bind(user.created_on)
        .bind(user.last_auth_on)
        .execute(&self.pool)
        .await?;
        Ok(user)
    }

    async fn update(&self, user: UserRecord) -> StoreResult<UserRecord> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $2, password_hash = $3, admin = $4, shared_account_ids = $5, last_auth_on = $6
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.admin)
        .bind(id_strings(&user.shared_account_ids))
        .bind(user.last_auth_on)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY username");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(UserRecord::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str, username: &str) -> UserRecord {
        UserRecord {
            id: UserId::from(id),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            admin: false,
            shared_account_ids: vec![],
            created_on: Utc::now(),
            last_auth_on: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_usernames() {
        let repo = MemoryUserRepository::new();
        repo.insert(record("a", "a@example.com")).await.unwrap();
        let err = repo.insert(record("b", "a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists));

        let stored = repo
            .find(UserKey::Username("a@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, UserId::from("a"));
    }

    #[tokio::test]
    async fn update_rejects_taking_another_username() {
        let repo = MemoryUserRepository::new();
        repo.insert(record("a", "a@example.com")).await.unwrap();
        repo.insert(record("b", "b@example.com")).await.unwrap();

        let err = repo.update(record("b", "a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists));
        let err = repo.update(record("c", "c@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn find_many_skips_missing_and_keeps_order() {
        let repo = MemoryUserRepository::new();
        repo.insert(record("a", "a@example.com")).await.unwrap();
        repo.insert(record("b", "b@example.com")).await.unwrap();

        let found = repo
            .find_many_by_ids(&[UserId::from("b"), UserId::from("gone"), UserId::from("a")])
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);

        let found = repo
            .find_many_by_usernames(&["nobody@example.com".into(), "a@example.com".into()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let repo = MemoryUserRepository::new();
        assert!(matches!(
            repo.delete(&UserId::from("x")).await,
            Err(StoreError::NotFound)
        ));
    }
}
