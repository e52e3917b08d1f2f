mod builder;
mod model;
pub mod urls;

pub use crate::builder::{ManifestBuilder, Page, iiif_image_path};
pub use crate::model::{
    Annotation, Canvas, DEFAULT_HEIGHT, DEFAULT_WIDTH, ImageResource, ImageService, Manifest, MetadataEntry, Sequence,
};
