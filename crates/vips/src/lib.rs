mod convert;
pub mod error;
mod pdf;
mod tool;

pub use crate::convert::{Converter, PtifOutput, TileCompression, TileParams, default_output, pages_to_convert};
pub use crate::pdf::Pdfinfo;
pub use crate::tool::Vips;
