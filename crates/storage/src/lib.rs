pub mod error;
mod models;
mod path;
pub mod shard;
mod store;

pub use crate::models::TileFile;
pub use crate::path::validate as validate_path;
pub use crate::store::TileStore;
