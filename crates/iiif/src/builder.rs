use crate::model::{
    Annotation, Canvas, DEFAULT_HEIGHT, DEFAULT_WIDTH, IMAGE_CONTEXT, IMAGE_PROFILE_LEVEL1, ImageResource,
    ImageService, Manifest, MetadataEntry, PRESENTATION_CONTEXT, Sequence,
};
use crate::urls::full_image_url;
use std::path::Path;

/// One page of a manifest: a discovered tile and its measured dimensions.
#[derive(Debug, Clone)]
pub struct Page {
    /// The tile's filename, used as the canvas label and identifier tail.
    pub filename: String,
    /// Absolute URL path of the Image API service for this tile,
    /// e.g. `/api/iiif/21/6_/document.pdf.ptif`.
    pub iiif_path: String,
    pub width: u32,
    pub height: u32,
}
impl Page {
    pub fn new(filename: impl Into<String>, iiif_path: impl Into<String>, width: u32, height: u32) -> Self {
        Self { filename: filename.into(), iiif_path: iiif_path.into(), width, height }
    }

    /// A page whose tile couldn't be measured; portrait A4-ish fallback.
    pub fn with_default_dimensions(filename: impl Into<String>, iiif_path: impl Into<String>) -> Self {
        Self::new(filename, iiif_path, DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// Derive the Image API path for a store-relative tile path.
///
/// The store shards tiles three directories deep (`21/6_/_/file.ptif`) but
/// the image server is mounted on the first two levels only, so the path
/// becomes `/api/iiif/21/6_/file.ptif`. Returns `None` when the path is too
/// shallow to carry both shard levels.
pub fn iiif_image_path(relative: &Path) -> Option<String> {
    let filename = relative.file_name()?.to_str()?;
    let mut dirs = relative.parent()?.iter().filter_map(|part| part.to_str());
    let first = dirs.next()?;
    let second = dirs.next()?;
    Some(format!("/api/iiif/{first}/{second}/{filename}"))
}

/// Assembles a Presentation v2 manifest for one record.
#[derive(Debug, Clone)]
pub struct ManifestBuilder {
    base_url: String,
    record_id: String,
    label: String,
    description: Option<String>,
    metadata: Vec<MetadataEntry>,
}
impl ManifestBuilder {
    pub fn new(base_url: impl AsRef<str>, record_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            record_id: record_id.into(),
            label: "PDF Document".to_string(),
            description: None,
            metadata: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn metadata(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push(MetadataEntry { label: label.into(), value: value.into() });
        self
    }

    fn record_url(&self, tail: &str) -> String {
        format!("{}/api/iiif/record:{}/{}", self.base_url, self.record_id, tail)
    }

    fn canvas(&self, page: &Page) -> Canvas {
        let canvas_id = self.record_url(&format!("canvas/{}", page.filename));
        let service_id = format!("{}{}", self.base_url, page.iiif_path);
        Canvas {
            id: canvas_id.clone(),
            type_: "sc:Canvas".to_string(),
            label: format!("Page from {}", page.filename),
            width: page.width,
            height: page.height,
            images: vec![Annotation {
                id: format!("{canvas_id}/image"),
                type_: "oa:Annotation".to_string(),
                motivation: "sc:painting".to_string(),
                resource: ImageResource {
                    id: full_image_url(&service_id),
                    type_: "dctypes:Image".to_string(),
                    format: "image/jpeg".to_string(),
                    width: page.width,
                    height: page.height,
                    service: ImageService {
                        id: service_id,
                        context: IMAGE_CONTEXT.to_string(),
                        profile: IMAGE_PROFILE_LEVEL1.to_string(),
                    },
                },
                on: canvas_id,
            }],
        }
    }

    pub fn build(&self, pages: &[Page]) -> Manifest {
        tracing::debug!(record = %self.record_id, pages = pages.len(), "Building manifest");
        Manifest {
            context: PRESENTATION_CONTEXT.to_string(),
            type_: "sc:Manifest".to_string(),
            id: self.record_url("manifest"),
            label: self.label.clone(),
            metadata: self.metadata.clone(),
            description: self.description.clone(),
            sequences: vec![Sequence {
                id: self.record_url("sequence/default"),
                type_: "sc:Sequence".to_string(),
                label: "Current Page Order".to_string(),
                viewing_direction: "left-to-right".to_string(),
                viewing_hint: "individuals".to_string(),
                canvases: pages.iter().map(|page| self.canvas(page)).collect(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn build_sample() -> Manifest {
        ManifestBuilder::new("https://127.0.0.1:5000/", "216")
            .description("Manifest generated for PDF document")
            .metadata("Publication Date", "2025-04-03")
            .build(&[
                Page::new("doc.pdf.page-1.ptif", "/api/iiif/21/6_/doc.pdf.page-1.ptif", 1240, 1754),
                Page::with_default_dimensions("doc.pdf.page-2.ptif", "/api/iiif/21/6_/doc.pdf.page-2.ptif"),
            ])
    }

    #[test]
    fn test_manifest_urls() {
        let manifest = build_sample();
        assert_eq!(manifest.id, "https://127.0.0.1:5000/api/iiif/record:216/manifest");
        assert_eq!(manifest.sequences[0].id, "https://127.0.0.1:5000/api/iiif/record:216/sequence/default");
        let canvas = &manifest.sequences[0].canvases[0];
        assert_eq!(canvas.id, "https://127.0.0.1:5000/api/iiif/record:216/canvas/doc.pdf.page-1.ptif");
        let resource = &canvas.images[0].resource;
        assert_eq!(
            resource.id,
            "https://127.0.0.1:5000/api/iiif/21/6_/doc.pdf.page-1.ptif/full/full/0/default.jpg"
        );
        assert_eq!(resource.service.id, "https://127.0.0.1:5000/api/iiif/21/6_/doc.pdf.page-1.ptif");
        assert_eq!(canvas.images[0].on, canvas.id);
    }

    #[test]
    fn test_manifest_json_shape() {
        let value = serde_json::to_value(build_sample()).unwrap();
        assert_eq!(value["@context"], "http://iiif.io/api/presentation/2/context.json");
        assert_eq!(value["@type"], "sc:Manifest");
        assert_eq!(value["sequences"][0]["viewingDirection"], "left-to-right");
        assert_eq!(value["sequences"][0]["canvases"].as_array().unwrap().len(), 2);
        assert_eq!(value["sequences"][0]["canvases"][0]["images"][0]["motivation"], "sc:painting");
        assert_eq!(
            value["sequences"][0]["canvases"][0]["images"][0]["resource"]["service"]["profile"],
            "http://iiif.io/api/image/2/level1.json"
        );
    }

    #[test]
    fn test_default_dimensions_applied() {
        let manifest = build_sample();
        let fallback = &manifest.sequences[0].canvases[1];
        assert_eq!((fallback.width, fallback.height), (1200, 1800));
        assert_eq!(manifest.canvas_count(), 2);
    }

    #[rstest]
    #[case("21/6_/_/scan.ptif", Some("/api/iiif/21/6_/scan.ptif"))]
    #[case("20/6_/_/deep/scan.ptif", Some("/api/iiif/20/6_/scan.ptif"))]
    #[case("scan.ptif", None)]
    #[case("21/scan.ptif", None)]
    fn test_iiif_image_path(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(iiif_image_path(&PathBuf::from(input)).as_deref(), expected);
    }
}
