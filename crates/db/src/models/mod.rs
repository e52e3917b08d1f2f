//! Row types for the host application's tables.

mod file;
mod media;
mod user;

pub use file::{NewObject, ObjectInfo, RecordBuckets, sha256_checksum};
pub use media::{MediaFileRow, TileStatus, media_file_json, promote_init, status_of};
pub use user::{ActionGrant, Role, UserRole, UserRow};
