//! Repositories over the host application's tables.
//!
//! Split by concern: accounts (users, roles, grants), files (buckets and
//! object versions), and tiles (media-file rows carrying processor state).

mod accounts;
mod files;
mod tiles;

pub use accounts::AccountsRepository;
pub use files::FilesRepository;
pub use tiles::TilesRepository;
