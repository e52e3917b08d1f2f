//! Direct Postgres access to the host application's tables.
//!
//! The host application owns the schema; this crate reads and patches
//! rows the way an operator with a psql session would, but with the
//! invariants (head demotion, checksum format, processor-status JSON)
//! encoded once instead of retyped each time.

pub mod error;

mod db;
mod models;
mod password;
mod repo;

pub use db::Database;
pub use models::{
    ActionGrant, MediaFileRow, NewObject, ObjectInfo, RecordBuckets, Role, TileStatus, UserRole,
    UserRow, media_file_json, promote_init, sha256_checksum, status_of,
};
pub use password::{hash_password, verify_password};
pub use repo::{AccountsRepository, FilesRepository, TilesRepository};
