//! Account rows: users, roles, and access-action grants.

use sqlx::FromRow;

/// A row from the accounts user table.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i32,
    pub email: String,
    pub active: bool,
    /// Derived in SQL from the confirmation timestamp.
    pub confirmed: bool,
}

/// A named role from the accounts role table.
#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// A user's membership in a role.
#[derive(Debug, Clone, FromRow)]
pub struct UserRole {
    pub email: String,
    pub role_name: String,
}

/// An access-action grant, held either directly or through a role.
///
/// `holder` is the user email for direct grants and the role name for
/// role grants; `via` says which.
#[derive(Debug, Clone, FromRow)]
pub struct ActionGrant {
    pub action: String,
    pub holder: String,
    pub via: String,
}
