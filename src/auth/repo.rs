use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User, UserRow};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A live (non-deleted) user already owns this username or email.
    #[error("{field} already registered")]
    Conflict { field: &'static str },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Credential store. Soft-deleted users are invisible to every lookup.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Uniqueness is decided here, not by prior lookups.
    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;
    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, role, \
                            is_active, is_deleted, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {column} = $1 AND NOT is_deleted"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| anyhow::Error::new(e).context(format!("find user by {column}")))?;
        Ok(row.map(User::try_from).transpose()?)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one("email", email).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND NOT is_deleted"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| anyhow::Error::new(e).context("find user by id"))?;
        Ok(row.map(User::try_from).transpose()?)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.full_name)
        .bind(new_user.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)?;
        Ok(User::try_from(row)?)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET is_deleted = TRUE, updated_at = now()
             WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(|e| anyhow::Error::new(e).context("soft delete user"))?;
        Ok(result.rows_affected() == 1)
    }
}

/// Unique-index violations become conflicts; the index name tells which field.
fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict {
                field: conflict_field(db_err.constraint()),
            };
        }
    }
    StoreError::Backend(anyhow::Error::new(err).context("insert user"))
}

/// Field owned by the violated unique index. The users table only has the
/// username and email indexes, so anything else is read as username.
fn conflict_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(c) if c.contains("email") => "email",
        _ => "username",
    }
}

/// Process-local store used when no database is configured, and by tests.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn find_live<P>(&self, pred: P) -> Option<User>
    where
        P: Fn(&User) -> bool,
    {
        self.users
            .read()
            .await
            .iter()
            .find(|u| !u.is_deleted && pred(u))
            .cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.find_live(|u| u.username == username).await)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.find_live(|u| u.email == email).await)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.find_live(|u| u.id == id).await)
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        // check and push under one write guard
        let mut users = self.users.write().await;
        for existing in users.iter().filter(|u| !u.is_deleted) {
            if existing.username == new_user.username {
                return Err(StoreError::Conflict { field: "username" });
            }
            if existing.email == new_user.email {
                return Err(StoreError::Conflict { field: "email" });
            }
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            role: new_user.role,
            is_active: true,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id && !u.is_deleted) {
            Some(user) => {
                user.is_deleted = true;
                user.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
impl MemoryUserStore {
    pub async fn set_active(&self, id: Uuid, active: bool) {
        if let Some(user) = self.users.write().await.iter_mut().find(|u| u.id == id) {
            user.is_active = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            password_hash: "$argon2id$placeholder".into(),
            full_name: None,
            role: Role::Teacher,
        }
    }

    #[test]
    fn unique_index_names_map_to_fields() {
        assert_eq!(conflict_field(Some("users_username_active_key")), "username");
        assert_eq!(conflict_field(Some("users_email_active_key")), "email");
        assert_eq!(conflict_field(None), "username");
    }

    #[test]
    fn non_database_errors_are_backend_failures() {
        let err = map_insert_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn insert_assigns_id_and_defaults() {
        let store = MemoryUserStore::new();
        let user = store.insert(new_user("alice", "a@x.com")).await.unwrap();
        assert!(user.is_active);
        assert!(!user.is_deleted);
        assert_eq!(user.role, Role::Teacher);

        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert!(store.find_by_email("a@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_username_and_email_conflict() {
        let store = MemoryUserStore::new();
        store.insert(new_user("alice", "a@x.com")).await.unwrap();

        let err = store.insert(new_user("alice", "other@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "username" }));

        let err = store.insert(new_user("bob", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "email" }));
    }

    #[tokio::test]
    async fn soft_deleted_users_are_hidden_and_free_their_names() {
        let store = MemoryUserStore::new();
        let user = store.insert(new_user("alice", "a@x.com")).await.unwrap();

        assert!(store.soft_delete(user.id).await.unwrap());
        assert!(!store.soft_delete(user.id).await.unwrap());
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
        assert!(store.find_by_username("alice").await.unwrap().is_none());

        let again = store.insert(new_user("alice", "a@x.com")).await.unwrap();
        assert_ne!(again.id, user.id);
    }
}
