use crate::error::{ErrorKind, Result};
use crate::tool::Vips;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// TIFF compression scheme used for the tile pyramid.
///
/// Deflate is lossless and the safe default; JPEG compresses photographic
/// scans far better at the cost of artifacts.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileCompression {
    #[display("deflate")]
    Deflate,
    #[display("jpeg")]
    Jpeg,
}
impl FromStr for TileCompression {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "deflate" => Ok(Self::Deflate),
            "jpeg" => Ok(Self::Jpeg),
            other => Err(format!("unknown tile compression `{other}` (expected `deflate` or `jpeg`)")),
        }
    }
}

/// Parameters for one pyramid build.
#[derive(Debug, Clone, Copy)]
pub struct TileParams {
    pub tile_width: u32,
    pub tile_height: u32,
    pub compression: TileCompression,
    /// Rasterization density for PDF pages.
    pub dpi: u32,
}
impl Default for TileParams {
    fn default() -> Self {
        Self { tile_width: 256, tile_height: 256, compression: TileCompression::Deflate, dpi: 300 }
    }
}

/// A freshly built PTIF with its measured properties.
#[derive(Debug, Clone)]
pub struct PtifOutput {
    pub path: PathBuf,
    pub size: u64,
    pub width: u32,
    pub height: u32,
}

/// How many pages of a PDF to actually convert.
///
/// Documents over twice the cap only get the first `cap` pages; anything
/// smaller is converted in full. Keeps a 900-page scan from monopolizing
/// the instance while still converting ordinary documents completely.
pub fn pages_to_convert(total: u32, cap: u32) -> u32 {
    if total > cap.saturating_mul(2) { cap } else { total }
}

/// Replace (or append) the input's extension with `.ptif`.
pub fn default_output(input: &Path) -> PathBuf {
    input.with_extension("ptif")
}

fn tiffsave_args(input: &Path, output: &Path, params: &TileParams) -> Vec<String> {
    vec![
        "tiffsave".to_string(),
        input.display().to_string(),
        output.display().to_string(),
        format!("--compression={}", params.compression),
        "--tile".to_string(),
        "--pyramid".to_string(),
        format!("--tile-width={}", params.tile_width),
        format!("--tile-height={}", params.tile_height),
    ]
}

fn pdfload_args(pdf: &Path, output: &Path, dpi: u32, page: u32) -> Vec<String> {
    vec![
        "pdfload".to_string(),
        pdf.display().to_string(),
        output.display().to_string(),
        format!("--dpi={dpi}"),
        // vips pages are zero-indexed; ours are one-indexed like pdfinfo.
        format!("--page={}", page.saturating_sub(1)),
    ]
}

/// Converts source images and PDF pages into pyramidal tiled TIFFs.
pub struct Converter {
    vips: Vips,
}
impl Converter {
    pub fn new(vips: Vips) -> Self {
        Self { vips }
    }

    pub fn discover() -> Result<Self> {
        Ok(Self::new(Vips::discover()?))
    }

    pub fn vips(&self) -> &Vips {
        &self.vips
    }

    /// Build a tile pyramid from an ordinary raster image.
    pub fn image_to_ptif(&self, input: &Path, output: &Path, params: &TileParams) -> Result<PtifOutput> {
        if !input.exists() {
            exn::bail!(ErrorKind::InputNotFound(input.to_path_buf()));
        }
        self.vips.run(&tiffsave_args(input, output, params))?;
        self.finish(output)
    }

    /// Rasterize one PDF page (one-indexed) and build its tile pyramid.
    ///
    /// The fixed two-invocation sequence: `pdfload` into a temporary TIFF,
    /// then `tiffsave` that into the final PTIF. The intermediate file is
    /// removed whether or not the second step succeeds.
    pub fn pdf_page_to_ptif(&self, pdf: &Path, page: u32, output: &Path, params: &TileParams) -> Result<PtifOutput> {
        if !pdf.exists() {
            exn::bail!(ErrorKind::InputNotFound(pdf.to_path_buf()));
        }
        let temp = tempfile::Builder::new()
            .prefix("tilectl-page-")
            .suffix(".tif")
            .tempfile()
            .map_err(|_| exn::Exn::from(ErrorKind::Io))?;
        self.vips.run(&pdfload_args(pdf, temp.path(), params.dpi, page))?;
        self.vips.run(&tiffsave_args(temp.path(), output, params))?;
        self.finish(output)
    }

    /// Verify the output landed on disk and measure it.
    fn finish(&self, output: &Path) -> Result<PtifOutput> {
        let metadata = match std::fs::metadata(output) {
            Ok(metadata) => metadata,
            Err(_) => exn::bail!(ErrorKind::OutputMissing(output.to_path_buf())),
        };
        let (width, height) = self.vips.dimensions(output)?;
        tracing::info!(path = %output.display(), size = metadata.len(), width, height, "PTIF created");
        Ok(PtifOutput { path: output.to_path_buf(), size: metadata.len(), width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_tiffsave_args_match_deployment_flags() {
        let params = TileParams::default();
        let args = tiffsave_args(Path::new("in.png"), Path::new("out.ptif"), &params);
        assert_eq!(
            args,
            vec![
                "tiffsave",
                "in.png",
                "out.ptif",
                "--compression=deflate",
                "--tile",
                "--pyramid",
                "--tile-width=256",
                "--tile-height=256",
            ]
        );
    }

    #[test]
    fn test_tiffsave_args_jpeg_compression() {
        let params = TileParams { compression: TileCompression::Jpeg, tile_width: 512, tile_height: 512, dpi: 300 };
        let args = tiffsave_args(Path::new("a.tif"), Path::new("a.ptif"), &params);
        assert!(args.contains(&"--compression=jpeg".to_string()));
        assert!(args.contains(&"--tile-width=512".to_string()));
    }

    #[test]
    fn test_pdfload_args_are_zero_indexed() {
        let args = pdfload_args(Path::new("doc.pdf"), Path::new("page.tif"), 300, 1);
        assert_eq!(args, vec!["pdfload", "doc.pdf", "page.tif", "--dpi=300", "--page=0"]);
        let args = pdfload_args(Path::new("doc.pdf"), Path::new("page.tif"), 150, 7);
        assert!(args.contains(&"--page=6".to_string()));
        assert!(args.contains(&"--dpi=150".to_string()));
    }

    #[rstest]
    #[case::small_pdf_in_full(5, 10, 5)]
    #[case::at_threshold_in_full(20, 10, 20)]
    #[case::over_threshold_capped(21, 10, 10)]
    #[case::huge_capped(900, 10, 10)]
    fn test_pages_to_convert(#[case] total: u32, #[case] cap: u32, #[case] expected: u32) {
        assert_eq!(pages_to_convert(total, cap), expected);
    }

    #[test]
    fn test_default_output_swaps_extension() {
        assert_eq!(default_output(Path::new("scan.png")), PathBuf::from("scan.ptif"));
        assert_eq!(default_output(Path::new("dir/photo.jpeg")), PathBuf::from("dir/photo.ptif"));
    }
}
