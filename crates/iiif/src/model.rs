//! IIIF Presentation API v2 document types.
//!
//! Only the subset the deployment's viewers actually read: a manifest with
//! one sequence of canvases, each canvas painting a single image resource
//! backed by an Image API v2 service. Field names follow the published
//! context (`@id`/`@type`/camelCase), hence the renames.

use serde::{Deserialize, Serialize};

pub const PRESENTATION_CONTEXT: &str = "http://iiif.io/api/presentation/2/context.json";
pub const IMAGE_CONTEXT: &str = "http://iiif.io/api/image/2/context.json";
pub const IMAGE_PROFILE_LEVEL1: &str = "http://iiif.io/api/image/2/level1.json";

/// Fallback canvas dimensions when a tile can't be measured.
pub const DEFAULT_WIDTH: u32 = 1200;
pub const DEFAULT_HEIGHT: u32 = 1800;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(rename = "@type")]
    pub type_: String,
    #[serde(rename = "@id")]
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sequences: Vec<Sequence>,
}
impl Manifest {
    /// Total canvases across all sequences; the number a viewer will show.
    pub fn canvas_count(&self) -> usize {
        self.sequences.iter().map(|s| s.canvases.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub type_: String,
    pub label: String,
    #[serde(rename = "viewingDirection")]
    pub viewing_direction: String,
    #[serde(rename = "viewingHint")]
    pub viewing_hint: String,
    pub canvases: Vec<Canvas>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Canvas {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub type_: String,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub images: Vec<Annotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub type_: String,
    pub motivation: String,
    pub resource: ImageResource,
    /// The canvas this annotation paints onto.
    pub on: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResource {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub type_: String,
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub service: ImageService,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageService {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@context")]
    pub context: String,
    pub profile: String,
}
