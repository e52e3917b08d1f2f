pub mod error;
mod load;
mod model;

pub use crate::load::{DEFAULT_FILE, load};
pub use crate::model::{ApiConfig, Config, DatabaseConfig, InstanceConfig, TilesConfig};
pub use tilectl_vips::TileCompression;
