//! `tilectl convert` — one source file in, one pyramidal TIFF out.

use crate::error::{ErrorKind, Result};
use clap::Args;
use exn::ResultExt;
use std::path::PathBuf;
use tilectl_config::Config;
use tilectl_vips::{Converter, PtifOutput, default_output};

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Source image or PDF.
    pub input: PathBuf,
    /// Output path (default: the input with a `.ptif` extension).
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// PDF page to convert, one-indexed (default: 1 for PDFs).
    #[arg(long, short)]
    pub page: Option<u32>,
}

pub fn is_pdf(path: &std::path::Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

pub async fn run(config: &Config, args: ConvertArgs) -> Result<()> {
    let converter = Converter::discover().or_raise(|| ErrorKind::Tiles)?;
    let output = args.output.clone().unwrap_or_else(|| default_output(&args.input));
    let ptif = convert_one(&converter, config, &args, &output)?;
    println!(
        "{} ({} bytes, {}x{})",
        ptif.path.display(),
        ptif.size,
        ptif.width,
        ptif.height
    );
    Ok(())
}

fn convert_one(
    converter: &Converter,
    config: &Config,
    args: &ConvertArgs,
    output: &std::path::Path,
) -> Result<PtifOutput> {
    let params = config.tiles.params();
    if is_pdf(&args.input) {
        let page = args.page.unwrap_or(1);
        converter
            .pdf_page_to_ptif(&args.input, page, output, &params)
            .or_raise(|| ErrorKind::Tiles)
    } else {
        if args.page.is_some() {
            exn::bail!(ErrorKind::Usage("--page only applies to PDF input"));
        }
        converter.image_to_ptif(&args.input, output, &params).or_raise(|| ErrorKind::Tiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_is_pdf_case_insensitive() {
        assert!(is_pdf(Path::new("scan.PDF")));
        assert!(is_pdf(Path::new("dir/report.pdf")));
        assert!(!is_pdf(Path::new("scan.tif")));
        assert!(!is_pdf(Path::new("noext")));
    }
}
