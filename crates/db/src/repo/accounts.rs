//! Repository for user accounts, roles, and access-action grants.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{ActionGrant, Role, UserRole, UserRow};
use crate::password::{hash_password, verify_password};
use exn::{OptionExt, ResultExt};
use sqlx::PgPool;

/// Read/write access to the accounts tables.
///
/// Password changes go through [`AccountsRepository::set_password`], which
/// hashes locally and writes the PHC string; nothing here ever stores a
/// plaintext password.
#[derive(Debug, Clone)]
pub struct AccountsRepository {
    pool: PgPool,
}
impl From<&Database> for AccountsRepository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl AccountsRepository {
    /// List every user account, ordered by id.
    pub async fn list_users(&self) -> Result<Vec<UserRow>> {
        sqlx::query_as(include_str!("../../queries/list_users.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Look up a single user by email address.
    pub async fn find_user(&self, email: &str) -> Result<Option<UserRow>> {
        sqlx::query_as(include_str!("../../queries/find_user_by_email.sql"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// List all defined roles, ordered by name.
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        sqlx::query_as(include_str!("../../queries/list_roles.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// List every user-to-role membership.
    pub async fn list_user_roles(&self) -> Result<Vec<UserRole>> {
        sqlx::query_as(include_str!("../../queries/list_user_roles.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// List access-action grants, both direct and via roles.
    pub async fn list_action_grants(&self) -> Result<Vec<ActionGrant>> {
        sqlx::query_as(include_str!("../../queries/list_action_grants.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Hash a new password and store it for the given user.
    ///
    /// Returns [`ErrorKind::NotFound`] if no account has that email.
    pub async fn set_password(&self, email: &str, password: &str) -> Result<()> {
        self.find_user(email).await?.ok_or_raise(|| ErrorKind::NotFound(format!("user {email}")))?;
        let hash = hash_password(password)?;
        sqlx::query(include_str!("../../queries/set_password_hash.sql"))
            .bind(email)
            .bind(&hash)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::info!(email, "Updated password hash");
        Ok(())
    }

    /// Check a plaintext password against the stored hash.
    ///
    /// Returns [`ErrorKind::NotFound`] if no account has that email, and
    /// `Ok(false)` for accounts with no password set.
    pub async fn check_password(&self, email: &str, password: &str) -> Result<bool> {
        let hash: Option<Option<String>> =
            sqlx::query_scalar(include_str!("../../queries/get_password_hash.sql"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .or_raise(|| ErrorKind::Database)?;
        let hash = hash.ok_or_raise(|| ErrorKind::NotFound(format!("user {email}")))?;
        match hash {
            Some(hash) => verify_password(password, &hash),
            None => Ok(false),
        }
    }
}
